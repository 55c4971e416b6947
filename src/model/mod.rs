pub mod balance;
pub mod collective_leave;
pub mod contract_leave;
pub mod employee;
pub mod leave_code;
pub mod leave_request;
pub mod leave_type;
pub mod role;
pub mod status;
pub mod user_role;
