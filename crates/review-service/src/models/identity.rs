//! 调用方身份

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// 平台角色
///
/// 大小写不敏感解析，未知值降级为普通用户。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Organizer,
    Admin,
}

impl Role {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ORGANIZER" => Self::Organizer,
            "ADMIN" => Self::Admin,
            _ => Self::User,
        }
    }

    /// 主办方级别角色（主办方或管理员）
    pub fn is_organizer_class(self) -> bool {
        matches!(self, Self::Organizer | Self::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::User => "USER",
            Self::Organizer => "ORGANIZER",
            Self::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::parse_lenient).unwrap_or_default())
    }
}

/// 身份服务返回的当前用户快照（GET /auth/me）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentitySnapshot {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::parse_lenient("organizer"), Role::Organizer);
        assert_eq!(Role::parse_lenient("ORGANIZER"), Role::Organizer);
        assert_eq!(Role::parse_lenient(" Admin "), Role::Admin);
        assert_eq!(Role::parse_lenient("USER"), Role::User);
        assert_eq!(Role::parse_lenient("superuser"), Role::User);
    }

    #[test]
    fn test_organizer_class() {
        assert!(Role::Organizer.is_organizer_class());
        assert!(Role::Admin.is_organizer_class());
        assert!(!Role::User.is_organizer_class());
        assert!(!Role::Organizer.is_admin());
    }

    #[test]
    fn test_identity_snapshot_deserialize() {
        let snapshot: IdentitySnapshot =
            serde_json::from_str(r#"{"id":42,"username":"alice","role":"organizer"}"#).unwrap();
        assert_eq!(snapshot.id, 42);
        assert_eq!(snapshot.role, Role::Organizer);

        let missing_role: IdentitySnapshot =
            serde_json::from_str(r#"{"id":1,"username":"bob","role":null}"#).unwrap();
        assert_eq!(missing_role.role, Role::User);
    }
}
