use serde::{Deserialize, Serialize};
use sqlx::MySql;
use sqlx::mysql::{MySqlTypeInfo, MySqlValueRef};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Status of a leave request (`usulcuti_status`).
///
/// `Verifikasi` and `Proses` are still moving through the approval chain,
/// every other status is final.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum LeaveStatus {
    /// Submitted, waiting for the immediate supervisor
    Verifikasi,
    /// Supervisor approved, waiting for the authorized official
    Proses,
    Terima,
    Ditolak,
    /// Cancelled by the requester
    Batal,
    /// Administratively invalid
    #[serde(rename = "BTL")]
    #[strum(serialize = "BTL")]
    Btl,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Verifikasi | LeaveStatus::Proses)
    }

    /// Read a sub-approver column (`atasanlangsung_status`, `pejabat_status`).
    /// Blanks and unknown text count as not decided.
    pub fn from_stage(raw: Option<&str>) -> Option<LeaveStatus> {
        raw.map(str::trim).and_then(|s| s.parse().ok())
    }
}

// Stored as plain text (VARCHAR / ENUM), so reuse the string codec.
impl sqlx::Type<MySql> for LeaveStatus {
    fn type_info() -> MySqlTypeInfo {
        <str as sqlx::Type<MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        <str as sqlx::Type<MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, MySql> for LeaveStatus {
    fn encode_by_ref(
        &self,
        buf: &mut <MySql as sqlx::database::HasArguments<'q>>::ArgumentBuffer,
    ) -> sqlx::encode::IsNull {
        <&str as sqlx::Encode<'q, MySql>>::encode_by_ref(&self.as_ref(), buf)
    }
}

impl<'r> sqlx::Decode<'r, MySql> for LeaveStatus {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'r, MySql>>::decode(value)?;
        Ok(s.parse::<LeaveStatus>()?)
    }
}
