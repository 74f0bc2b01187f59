//! Anspruchs-Paare der authentifizierten Identitaet

use serde::{Deserialize, Serialize};

/// Ein einzelner Anspruch (Typ/Wert-Paar)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anspruch {
    /// Anspruchs-Typ (z.B. eine Rollen- oder Scope-URI)
    pub typ: String,
    /// Anspruchs-Wert
    pub wert: String,
}

impl Anspruch {
    pub fn neu(typ: impl Into<String>, wert: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            wert: wert.into(),
        }
    }
}
