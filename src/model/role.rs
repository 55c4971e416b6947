use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema, Display, EnumString, AsRefStr)]
pub enum Role {
    #[serde(rename = "Super Admin")]
    #[strum(serialize = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Admin SKPD")]
    #[strum(serialize = "Admin SKPD")]
    AdminSkpd,
    #[serde(rename = "Admin Uker")]
    #[strum(serialize = "Admin Uker")]
    AdminUker,
    Pegawai,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::SuperAdmin),
            2 => Some(Role::AdminSkpd),
            3 => Some(Role::AdminUker),
            4 => Some(Role::Pegawai),
            _ => None,
        }
    }

    /// Role level as carried in the token; lower is broader.
    pub fn level(&self) -> u8 {
        match self {
            Role::SuperAdmin => 1,
            Role::AdminSkpd => 2,
            Role::AdminUker => 3,
            Role::Pegawai => 4,
        }
    }

    /// Every role except the base employee role may verify leave.
    pub fn is_admin(&self) -> bool {
        !matches!(self, Role::Pegawai)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_level() {
        for id in 1..=4u8 {
            assert_eq!(Role::from_id(id).map(|r| r.level()), Some(id));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(5), None);
    }

    #[test]
    fn only_pegawai_is_not_admin() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::AdminSkpd.is_admin());
        assert!(Role::AdminUker.is_admin());
        assert!(!Role::Pegawai.is_admin());
    }

    #[test]
    fn display_uses_the_front_end_labels() {
        assert_eq!(Role::AdminSkpd.to_string(), "Admin SKPD");
        assert_eq!("Admin Uker".parse::<Role>().unwrap(), Role::AdminUker);
    }
}
