use crate::api::collective_leave::{CollectiveLeaveListResponse, CreateCollectiveLeave};
use crate::api::contract_leave::{ContractLeaveListResponse, CreateContractLeave};
use crate::api::leave_code::{CreateLeaveCode, UpdateLeaveCode};
use crate::api::leave_request::{
    CreateLeave, LeaveFilter, LeaveListResponse, Location, SupervisorDecision, TransitionResponse,
};
use crate::api::leave_type::LeaveTypePayload;
use crate::api::user_role::{AssignRole, UserRoleListResponse};
use crate::auth::handlers::{LoginResponse, ProfileResponse};
use crate::model::balance::{LeaveBalanceEntry, LeaveBalanceSummary};
use crate::model::collective_leave::CollectiveLeave;
use crate::model::contract_leave::ContractLeave;
use crate::model::employee::Employee;
use crate::model::leave_code::LeaveCode;
use crate::model::leave_request::LeaveRequest;
use crate::model::leave_type::LeaveType;
use crate::model::role::Role;
use crate::model::status::LeaveStatus;
use crate::model::user_role::UserRoleAssignment;
use crate::models::LoginReqDto;
use crate::workflow::statistics::{DashboardItem, LeaveStatistics, RecapItem, TypeTotal};
use crate::workflow::transition::{StatusPatch, SupervisorVerdict, Transition};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cuti API",
        version = "1.0.0",
        description = r#"
## Leave management (cuti)

Employees submit leave requests, administrators verify them through a
two-stage approval chain, and everyone can see how much leave they used.

### Approval flow
- `Verifikasi` → approve → `Proses` (immediate supervisor approved)
- the named supervisor may also answer `Terima` / `Ditolak` through
  `PUT /api/cuti/{leave_id}/atasan`
- `Proses` → approve → `Terima` (authorized official approved)
- `Verifikasi` / `Proses` → reject → `Ditolak`
- `Verifikasi` → cancel by the requester → `Batal`
- `Terima`, `Ditolak`, `Batal` and `BTL` are final
- nobody approves or rejects their own request

Contract employees' leave (`/api/cuti-kontrak`) follows the same chain.

### Security
All `/api` endpoints need a **JWT Bearer** access token from `/auth/login`.
Roles: Super Admin, Admin SKPD, Admin Uker and Pegawai. Admin roles only see
requests inside their own SKPD or subunit.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::profile,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::subordinate_list,
        crate::api::leave_request::verify_subordinate,

        crate::api::contract_leave::contract_list,
        crate::api::contract_leave::get_contract,
        crate::api::contract_leave::create_contract,
        crate::api::contract_leave::approve_contract,
        crate::api::contract_leave::reject_contract,
        crate::api::contract_leave::cancel_contract,

        crate::api::collective_leave::collective_list,
        crate::api::collective_leave::create_collective,
        crate::api::collective_leave::delete_collective,

        crate::api::balance::my_balance,
        crate::api::balance::employee_balance,

        crate::api::report::statistics,
        crate::api::report::status_dashboard,
        crate::api::report::monthly_report,
        crate::api::report::recapitulation,
        crate::api::report::leave_book,

        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::update_leave_type,
        crate::api::leave_type::delete_leave_type,

        crate::api::leave_code::list_codes,
        crate::api::leave_code::create_code,
        crate::api::leave_code::update_code,
        crate::api::leave_code::delete_code,

        crate::api::user_role::user_role_list,
        crate::api::user_role::assign_role,
        crate::api::user_role::remove_role
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            ProfileResponse,
            Employee,
            Role,
            LeaveStatus,
            LeaveRequest,
            LeaveFilter,
            LeaveListResponse,
            CreateLeave,
            Location,
            Transition,
            StatusPatch,
            TransitionResponse,
            SupervisorDecision,
            SupervisorVerdict,
            ContractLeave,
            CreateContractLeave,
            ContractLeaveListResponse,
            CollectiveLeave,
            CreateCollectiveLeave,
            CollectiveLeaveListResponse,
            LeaveBalanceSummary,
            LeaveBalanceEntry,
            LeaveStatistics,
            TypeTotal,
            DashboardItem,
            RecapItem,
            LeaveType,
            LeaveTypePayload,
            LeaveCode,
            CreateLeaveCode,
            UpdateLeaveCode,
            UserRoleAssignment,
            AssignRole,
            UserRoleListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and session"),
        (name = "Cuti", description = "Leave requests, approval and balance"),
        (name = "Cuti Kontrak", description = "Leave of contract employees"),
        (name = "Cuti Bersama", description = "Collective leave days"),
        (name = "Laporan", description = "Leave reports"),
        (name = "Master", description = "Reference data"),
        (name = "Manajemen User", description = "Accounts and roles"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
