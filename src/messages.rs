//! User-facing strings for the auth flows, keyed by the language preference.

use crate::preferences::Language;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Messages {
    language: Language,
}

impl Messages {
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    #[must_use]
    pub const fn login_failed(self) -> &'static str {
        match self.language {
            Language::En => "Login failed. Please check your credentials and try again.",
            Language::Fr => "Échec de la connexion. Vérifiez vos identifiants et réessayez.",
        }
    }

    #[must_use]
    pub const fn register_failed(self) -> &'static str {
        match self.language {
            Language::En => "Registration failed. Please try again.",
            Language::Fr => "Échec de l'inscription. Veuillez réessayer.",
        }
    }

    #[must_use]
    pub const fn network_failed(self) -> &'static str {
        match self.language {
            Language::En => "Unable to reach the server. Please try again.",
            Language::Fr => "Impossible de joindre le serveur. Veuillez réessayer.",
        }
    }

    #[must_use]
    pub const fn missing_credentials(self) -> &'static str {
        match self.language {
            Language::En => "Please enter your phone number or email and your password.",
            Language::Fr => "Veuillez saisir votre numéro ou e-mail et votre mot de passe.",
        }
    }

    #[must_use]
    pub const fn invalid_email(self) -> &'static str {
        match self.language {
            Language::En => "Please enter a valid email address.",
            Language::Fr => "Veuillez saisir une adresse e-mail valide.",
        }
    }

    #[must_use]
    pub const fn session_rejected(self) -> &'static str {
        match self.language {
            Language::En => "Your session could not be verified.",
            Language::Fr => "Votre session n'a pas pu être vérifiée.",
        }
    }

    /// Warning shown when a session reaches a view its role does not allow.
    #[must_use]
    pub const fn no_permission(self) -> &'static str {
        match self.language {
            Language::En => "You do not have permission to access this page.",
            Language::Fr => "Vous n'avez pas l'autorisation d'accéder à cette page.",
        }
    }
}
