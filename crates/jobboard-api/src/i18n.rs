//! User-facing messages in English and Spanish.
//!
//! Errors carry a [`Message`] key; the text is chosen per request from
//! `Accept-Language` when the error is rendered.

use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::HeaderMap;

use jobboard_models::Resource;

/// Response language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    /// Pick the first supported language from an `Accept-Language` value,
    /// honoring q-weights. Anything unrecognized falls back to English.
    pub fn from_accept_language(value: &str) -> Self {
        let mut best: Option<(f32, Lang)> = None;
        for part in value.split(',') {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next().unwrap_or_default().trim().to_ascii_lowercase();
            let weight = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            let lang = match tag.split('-').next() {
                Some("es") => Lang::Es,
                Some("en") => Lang::En,
                _ => continue,
            };
            if best.map_or(true, |(w, _)| weight > w) {
                best = Some((weight, lang));
            }
        }
        best.map(|(_, lang)| lang).unwrap_or_default()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Self::from_accept_language)
            .unwrap_or_default()
    }
}

/// Message key for every user-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    // Validation
    InvalidInput,
    InvalidField,
    InvalidQuery,
    MissingFile,
    UnsupportedFileType,
    FileTooLarge,
    EmptyFile,
    ReasonRequired,
    UnknownReferenceKind,
    UnknownExportEntity,
    UnknownExportFormat,

    // Authentication
    AuthRequired,
    InvalidToken,

    // Authorization
    RowDenied(Resource),
    RoleNotAllowed,
    AdminOnly,
    AccountInactive,
    SelfProtection,

    // Not found
    UserNotFound,
    CompanyNotFound,
    /// Row removed between read and write
    RowGone,
    NoResume,
    NoCompany,
    NoLogo,
    RouteNotFound,

    // State conflicts
    StatusUnchanged,
    TransitionNotAllowed,
    JobNotEditable,
    JobNotAcceptingApplications,
    AlreadyApplied,
    AlreadyRegistered,
    AlreadyVerified,
    AlreadyExists,

    // Dependencies
    CompanyHasPublishedJobs,
    CompanyHasActiveApplications,
    JobHasApplications,

    RateLimited,
    Internal,
}

impl Message {
    pub fn text(&self, lang: Lang) -> &'static str {
        match lang {
            Lang::En => self.en(),
            Lang::Es => self.es(),
        }
    }

    fn en(&self) -> &'static str {
        match self {
            Message::InvalidInput => "The request body is not valid",
            Message::InvalidField => "Invalid value for field",
            Message::InvalidQuery => "Invalid query parameters",
            Message::MissingFile => "No file was uploaded",
            Message::UnsupportedFileType => "This file type is not supported",
            Message::FileTooLarge => "The file is too large",
            Message::EmptyFile => "The file is empty",
            Message::ReasonRequired => "A reason is required",
            Message::UnknownReferenceKind => "Unknown reference list",
            Message::UnknownExportEntity => "Unknown export entity",
            Message::UnknownExportFormat => "Unknown export format",
            Message::AuthRequired => "You must be signed in",
            Message::InvalidToken => "Your session is invalid or has expired",
            Message::RowDenied(Resource::Profile) => "Profile not found or you do not have access to it",
            Message::RowDenied(Resource::Company) => "Company not found or you do not have access to it",
            Message::RowDenied(Resource::Job) => "Job not found or you do not have access to it",
            Message::RowDenied(Resource::Application) => "Application not found or you do not have access to it",
            Message::RoleNotAllowed => "Your role does not allow this action",
            Message::AdminOnly => "Administrator access required",
            Message::AccountInactive => "Your account has been deactivated",
            Message::SelfProtection => "Administrators cannot change their own role or status",
            Message::UserNotFound => "User not found",
            Message::CompanyNotFound => "Company not found",
            Message::RowGone => "The record no longer exists",
            Message::NoResume => "No resume has been uploaded",
            Message::NoCompany => "You have not created a company yet",
            Message::NoLogo => "The company has no logo",
            Message::RouteNotFound => "Resource not found",
            Message::StatusUnchanged => "The status is already set to this value",
            Message::TransitionNotAllowed => "This status change is not allowed",
            Message::JobNotEditable => "Only draft or pending jobs can be edited",
            Message::JobNotAcceptingApplications => "This job is not accepting applications",
            Message::AlreadyApplied => "You have already applied to this job",
            Message::AlreadyRegistered => "Your profile is already registered",
            Message::AlreadyVerified => "The company is already verified",
            Message::AlreadyExists => "This record already exists",
            Message::CompanyHasPublishedJobs => "The company has published jobs; close or archive them first",
            Message::CompanyHasActiveApplications => "The company has applications in progress",
            Message::JobHasApplications => "The job has applications and cannot be deleted; archive it instead",
            Message::RateLimited => "Too many requests, please try again later",
            Message::Internal => "An internal error occurred",
        }
    }

    fn es(&self) -> &'static str {
        match self {
            Message::InvalidInput => "El cuerpo de la solicitud no es válido",
            Message::InvalidField => "Valor no válido para el campo",
            Message::InvalidQuery => "Parámetros de consulta no válidos",
            Message::MissingFile => "No se subió ningún archivo",
            Message::UnsupportedFileType => "Este tipo de archivo no es compatible",
            Message::FileTooLarge => "El archivo es demasiado grande",
            Message::EmptyFile => "El archivo está vacío",
            Message::ReasonRequired => "Se requiere un motivo",
            Message::UnknownReferenceKind => "Lista de referencia desconocida",
            Message::UnknownExportEntity => "Entidad de exportación desconocida",
            Message::UnknownExportFormat => "Formato de exportación desconocido",
            Message::AuthRequired => "Debes iniciar sesión",
            Message::InvalidToken => "Tu sesión no es válida o ha expirado",
            Message::RowDenied(Resource::Profile) => "Perfil no encontrado o sin acceso",
            Message::RowDenied(Resource::Company) => "Empresa no encontrada o sin acceso",
            Message::RowDenied(Resource::Job) => "Empleo no encontrado o sin acceso",
            Message::RowDenied(Resource::Application) => "Postulación no encontrada o sin acceso",
            Message::RoleNotAllowed => "Tu rol no permite esta acción",
            Message::AdminOnly => "Se requiere acceso de administrador",
            Message::AccountInactive => "Tu cuenta ha sido desactivada",
            Message::SelfProtection => "Los administradores no pueden cambiar su propio rol o estado",
            Message::UserNotFound => "Usuario no encontrado",
            Message::CompanyNotFound => "Empresa no encontrada",
            Message::RowGone => "El registro ya no existe",
            Message::NoResume => "No se ha subido ningún currículum",
            Message::NoCompany => "Aún no has creado una empresa",
            Message::NoLogo => "La empresa no tiene logotipo",
            Message::RouteNotFound => "Recurso no encontrado",
            Message::StatusUnchanged => "El estado ya tiene este valor",
            Message::TransitionNotAllowed => "Este cambio de estado no está permitido",
            Message::JobNotEditable => "Solo se pueden editar empleos en borrador o pendientes",
            Message::JobNotAcceptingApplications => "Este empleo no acepta postulaciones",
            Message::AlreadyApplied => "Ya te postulaste a este empleo",
            Message::AlreadyRegistered => "Tu perfil ya está registrado",
            Message::AlreadyVerified => "La empresa ya está verificada",
            Message::AlreadyExists => "Este registro ya existe",
            Message::CompanyHasPublishedJobs => "La empresa tiene empleos publicados; ciérralos o archívalos primero",
            Message::CompanyHasActiveApplications => "La empresa tiene postulaciones en curso",
            Message::JobHasApplications => "El empleo tiene postulaciones y no se puede eliminar; archívalo",
            Message::RateLimited => "Demasiadas solicitudes, inténtalo más tarde",
            Message::Internal => "Ocurrió un error interno",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_language_picks_supported_tag() {
        assert_eq!(Lang::from_accept_language("es-MX,es;q=0.9,en;q=0.8"), Lang::Es);
        assert_eq!(Lang::from_accept_language("en-US"), Lang::En);
        assert_eq!(Lang::from_accept_language("fr-FR, es;q=0.5"), Lang::Es);
        assert_eq!(Lang::from_accept_language("de"), Lang::En);
        assert_eq!(Lang::from_accept_language("en;q=0.4, es;q=0.7"), Lang::Es);
    }

    #[test]
    fn test_row_denials_share_one_text_per_resource() {
        let msg = Message::RowDenied(Resource::Job);
        assert!(msg.text(Lang::En).starts_with("Job not found"));
        assert!(msg.text(Lang::Es).starts_with("Empleo"));
    }
}
