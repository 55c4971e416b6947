use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "198501012010011001")]
    pub pegawai_nip: String,
    pub password: String,
}

/// Account row joined with the employee's current placement.
#[derive(FromRow)]
pub struct UserSql {
    pub pegawai_id: u64,
    pub pegawai_nip: String,
    pub password: String,
    pub role_id: u8,
    pub skpd_id: u64,
    pub subunit_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub pegawai_id: u64,
    /// NIP
    pub sub: String,
    pub role: u8, // role id, also the role level
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    pub skpd_id: u64,
    pub subunit_id: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
