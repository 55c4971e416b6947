use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use super::WorkflowError;
use crate::model::role::Role;
use crate::model::status::LeaveStatus;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Approve,
    Reject,
    Cancel,
}

/// Whether the final approval needs a recorded supervisor approval.
///
/// `Lenient` lets a request sitting in `Proses` go straight to `Terima`
/// even if `atasanlangsung_status` was never written, which is how the old
/// verification screen behaved.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApprovalPolicy {
    #[default]
    Strict,
    Lenient,
}

/// Who is acting on a request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Actor {
    pub pegawai_id: u64,
    pub role: Role,
}

/// The state of a request as far as the transition table is concerned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Subject {
    pub status: LeaveStatus,
    pub owner_id: u64,
    /// `atasanlangsung_id`, the designated immediate supervisor
    pub supervisor_id: Option<u64>,
    /// `atasanlangsung_status`; `None` until the supervisor stage is decided
    pub supervisor_status: Option<LeaveStatus>,
}

impl Subject {
    pub fn supervisor_approved(&self) -> bool {
        self.supervisor_status == Some(LeaveStatus::Terima)
    }
}

/// What an immediate supervisor may answer for a subordinate's request.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum SupervisorVerdict {
    Terima,
    Ditolak,
}

impl SupervisorVerdict {
    pub fn action(self) -> Action {
        match self {
            SupervisorVerdict::Terima => Action::Approve,
            SupervisorVerdict::Ditolak => Action::Reject,
        }
    }
}

/// Sub-approver fields to write alongside the new status. `None` leaves
/// the stored value alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusPatch {
    pub atasanlangsung_status: Option<LeaveStatus>,
    pub pejabat_status: Option<LeaveStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transition {
    pub next: LeaveStatus,
    #[serde(flatten)]
    pub patch: StatusPatch,
}

impl Transition {
    fn to(next: LeaveStatus) -> Self {
        Self {
            next,
            patch: StatusPatch::default(),
        }
    }

    fn supervisor(mut self, status: LeaveStatus) -> Self {
        self.patch.atasanlangsung_status = Some(status);
        self
    }

    fn official(mut self, status: LeaveStatus) -> Self {
        self.patch.pejabat_status = Some(status);
        self
    }
}

/// Work out the next status for `action` on `subject`.
///
/// | current             | action  | actor           | next    | patch                 |
/// |---------------------|---------|-----------------|---------|-----------------------|
/// | Verifikasi          | approve | admin           | Proses  | atasanlangsung=Terima |
/// | Proses              | approve | admin           | Terima  | pejabat=Terima        |
/// | Verifikasi / Proses | reject  | admin           | Ditolak |                       |
/// | Verifikasi          | cancel  | owner           | Batal   |                       |
///
/// Admins never decide on their own requests. Anything else is an error;
/// nothing is mutated here.
pub fn resolve(
    subject: &Subject,
    action: Action,
    actor: &Actor,
    policy: ApprovalPolicy,
) -> Result<Transition, WorkflowError> {
    use LeaveStatus::*;

    match action {
        Action::Approve | Action::Reject if !actor.role.is_admin() => {
            Err(WorkflowError::ForbiddenRole {
                role: actor.role,
                action,
            })
        }
        Action::Approve | Action::Reject if actor.pegawai_id == subject.owner_id => {
            Err(WorkflowError::SelfDecision)
        }
        Action::Approve => match subject.status {
            Verifikasi => Ok(Transition::to(Proses).supervisor(Terima)),
            Proses if subject.supervisor_approved() || policy == ApprovalPolicy::Lenient => {
                Ok(Transition::to(Terima).official(Terima))
            }
            Proses => Err(WorkflowError::SupervisorPending),
            status => Err(WorkflowError::NotPermitted { action, status }),
        },
        Action::Reject => match subject.status {
            Verifikasi | Proses => Ok(Transition::to(Ditolak)),
            status => Err(WorkflowError::NotPermitted { action, status }),
        },
        Action::Cancel => {
            if actor.pegawai_id != subject.owner_id {
                return Err(WorkflowError::NotOwner);
            }
            match subject.status {
                Verifikasi => Ok(Transition::to(Batal)),
                status => Err(WorkflowError::NotPermitted { action, status }),
            }
        }
    }
}

/// The immediate supervisor's decision on a request still in `Verifikasi`.
///
/// Approval completes the first stage (`Proses`, `atasanlangsung=Terima`);
/// refusal ends the request (`Ditolak`, `atasanlangsung=Ditolak`). Only the
/// person named in `atasanlangsung_id` may answer, whatever their role.
pub fn resolve_supervisor(
    subject: &Subject,
    verdict: SupervisorVerdict,
    actor: &Actor,
) -> Result<Transition, WorkflowError> {
    use LeaveStatus::*;

    if actor.pegawai_id == subject.owner_id {
        return Err(WorkflowError::SelfDecision);
    }
    if subject.supervisor_id != Some(actor.pegawai_id) {
        return Err(WorkflowError::NotSupervisor);
    }
    if subject.status != Verifikasi {
        return Err(WorkflowError::NotPermitted {
            action: verdict.action(),
            status: subject.status,
        });
    }
    if subject.supervisor_status.is_some() {
        return Err(WorkflowError::AlreadyDecided);
    }

    Ok(match verdict {
        SupervisorVerdict::Terima => Transition::to(Proses).supervisor(Terima),
        SupervisorVerdict::Ditolak => Transition::to(Ditolak).supervisor(Ditolak),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use strum::IntoEnumIterator;

    const OWNER: u64 = 100;

    fn admin() -> Actor {
        Actor {
            pegawai_id: 1,
            role: Role::AdminSkpd,
        }
    }

    fn owner() -> Actor {
        Actor {
            pegawai_id: OWNER,
            role: Role::Pegawai,
        }
    }

    const SUPERVISOR: u64 = 20;

    fn subject(status: LeaveStatus) -> Subject {
        Subject {
            status,
            owner_id: OWNER,
            supervisor_id: Some(SUPERVISOR),
            supervisor_status: None,
        }
    }

    fn supervisor() -> Actor {
        Actor {
            pegawai_id: SUPERVISOR,
            role: Role::Pegawai,
        }
    }

    fn strict(s: &Subject, action: Action, actor: &Actor) -> Result<Transition, WorkflowError> {
        resolve(s, action, actor, ApprovalPolicy::Strict)
    }

    #[test]
    fn first_approval_moves_to_proses() {
        let t = strict(&subject(LeaveStatus::Verifikasi), Action::Approve, &admin()).unwrap();
        assert_eq!(t.next, LeaveStatus::Proses);
        assert_eq!(t.patch.atasanlangsung_status, Some(LeaveStatus::Terima));
        assert_eq!(t.patch.pejabat_status, None);
    }

    #[test]
    fn second_approval_moves_to_terima() {
        let s = Subject {
            supervisor_status: Some(LeaveStatus::Terima),
            ..subject(LeaveStatus::Proses)
        };
        let t = strict(&s, Action::Approve, &admin()).unwrap();
        assert_eq!(t.next, LeaveStatus::Terima);
        assert_eq!(t.patch.pejabat_status, Some(LeaveStatus::Terima));
        assert_eq!(t.patch.atasanlangsung_status, None);
    }

    #[test]
    fn strict_policy_needs_supervisor_stage() {
        let s = subject(LeaveStatus::Proses);
        assert_matches!(
            strict(&s, Action::Approve, &admin()),
            Err(WorkflowError::SupervisorPending)
        );
    }

    #[test]
    fn lenient_policy_skips_missing_supervisor_stage() {
        let s = subject(LeaveStatus::Proses);
        let t = resolve(&s, Action::Approve, &admin(), ApprovalPolicy::Lenient).unwrap();
        assert_eq!(t.next, LeaveStatus::Terima);
        assert_eq!(t.patch.pejabat_status, Some(LeaveStatus::Terima));
    }

    #[test]
    fn reject_from_either_open_state() {
        for status in [LeaveStatus::Verifikasi, LeaveStatus::Proses] {
            let t = strict(&subject(status), Action::Reject, &admin()).unwrap();
            assert_eq!(t.next, LeaveStatus::Ditolak);
            assert_eq!(t.patch, StatusPatch::default());
        }
    }

    #[test]
    fn owner_cancels_while_waiting() {
        let t = strict(&subject(LeaveStatus::Verifikasi), Action::Cancel, &owner()).unwrap();
        assert_eq!(t.next, LeaveStatus::Batal);
        assert_eq!(t.patch, StatusPatch::default());
    }

    #[test]
    fn cancel_after_first_approval_is_refused() {
        assert_matches!(
            strict(&subject(LeaveStatus::Proses), Action::Cancel, &owner()),
            Err(WorkflowError::NotPermitted {
                action: Action::Cancel,
                status: LeaveStatus::Proses
            })
        );
    }

    #[test]
    fn cancel_by_someone_else_is_refused() {
        // an administrator is still not the owner
        assert_matches!(
            strict(&subject(LeaveStatus::Verifikasi), Action::Cancel, &admin()),
            Err(WorkflowError::NotOwner)
        );
    }

    #[test]
    fn pegawai_cannot_approve_or_reject() {
        for action in [Action::Approve, Action::Reject] {
            assert_matches!(
                strict(&subject(LeaveStatus::Verifikasi), action, &owner()),
                Err(WorkflowError::ForbiddenRole {
                    role: Role::Pegawai,
                    ..
                })
            );
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        let approved_proses = |status| Subject {
            supervisor_status: Some(LeaveStatus::Terima),
            ..subject(status)
        };
        for status in LeaveStatus::iter().filter(LeaveStatus::is_terminal) {
            let s = approved_proses(status);
            for (action, actor) in [
                (Action::Approve, admin()),
                (Action::Reject, admin()),
                (Action::Cancel, owner()),
            ] {
                assert_matches!(
                    resolve(&s, action, &actor, ApprovalPolicy::Lenient),
                    Err(WorkflowError::NotPermitted { .. }),
                    "{action} from {status}"
                );
            }
        }
    }

    #[test]
    fn admin_cannot_decide_own_request() {
        let own = Actor {
            pegawai_id: OWNER,
            role: Role::AdminSkpd,
        };
        for action in [Action::Approve, Action::Reject] {
            assert_matches!(
                strict(&subject(LeaveStatus::Verifikasi), action, &own),
                Err(WorkflowError::SelfDecision)
            );
        }
        // cancelling stays open to the owner whatever their role
        assert_matches!(
            strict(&subject(LeaveStatus::Verifikasi), Action::Cancel, &own),
            Ok(Transition {
                next: LeaveStatus::Batal,
                ..
            })
        );
    }

    #[test]
    fn supervisor_approval_completes_first_stage() {
        let t = resolve_supervisor(
            &subject(LeaveStatus::Verifikasi),
            SupervisorVerdict::Terima,
            &supervisor(),
        )
        .unwrap();
        assert_eq!(t.next, LeaveStatus::Proses);
        assert_eq!(t.patch.atasanlangsung_status, Some(LeaveStatus::Terima));

        // and unlocks the final approval under the strict policy
        let s = Subject {
            status: t.next,
            supervisor_status: t.patch.atasanlangsung_status,
            ..subject(LeaveStatus::Verifikasi)
        };
        assert_matches!(
            strict(&s, Action::Approve, &admin()),
            Ok(Transition {
                next: LeaveStatus::Terima,
                ..
            })
        );
    }

    #[test]
    fn supervisor_refusal_ends_request() {
        let t = resolve_supervisor(
            &subject(LeaveStatus::Verifikasi),
            SupervisorVerdict::Ditolak,
            &supervisor(),
        )
        .unwrap();
        assert_eq!(t.next, LeaveStatus::Ditolak);
        assert_eq!(t.patch.atasanlangsung_status, Some(LeaveStatus::Ditolak));
        assert_eq!(t.patch.pejabat_status, None);
    }

    #[test]
    fn only_designated_supervisor_may_verify() {
        assert_matches!(
            resolve_supervisor(&subject(LeaveStatus::Verifikasi), SupervisorVerdict::Terima, &admin()),
            Err(WorkflowError::NotSupervisor)
        );
        let nobody = Subject {
            supervisor_id: None,
            ..subject(LeaveStatus::Verifikasi)
        };
        assert_matches!(
            resolve_supervisor(&nobody, SupervisorVerdict::Terima, &supervisor()),
            Err(WorkflowError::NotSupervisor)
        );
    }

    #[test]
    fn supervisor_answers_once_and_only_while_waiting() {
        let decided = Subject {
            supervisor_status: Some(LeaveStatus::Ditolak),
            ..subject(LeaveStatus::Verifikasi)
        };
        assert_matches!(
            resolve_supervisor(&decided, SupervisorVerdict::Terima, &supervisor()),
            Err(WorkflowError::AlreadyDecided)
        );
        assert_matches!(
            resolve_supervisor(&subject(LeaveStatus::Proses), SupervisorVerdict::Ditolak, &supervisor()),
            Err(WorkflowError::NotPermitted {
                action: Action::Reject,
                status: LeaveStatus::Proses
            })
        );
    }

    #[test]
    fn requester_named_as_own_supervisor_is_refused() {
        let s = Subject {
            supervisor_id: Some(OWNER),
            ..subject(LeaveStatus::Verifikasi)
        };
        assert_matches!(
            resolve_supervisor(&s, SupervisorVerdict::Terima, &owner()),
            Err(WorkflowError::SelfDecision)
        );
    }

    #[test]
    fn policy_parses_from_config_text() {
        assert_eq!("strict".parse::<ApprovalPolicy>().unwrap(), ApprovalPolicy::Strict);
        assert_eq!("lenient".parse::<ApprovalPolicy>().unwrap(), ApprovalPolicy::Lenient);
        assert_eq!("Lenient".parse::<ApprovalPolicy>().unwrap(), ApprovalPolicy::Lenient);
        assert!("loose".parse::<ApprovalPolicy>().is_err());
    }
}
