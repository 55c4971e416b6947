use crate::{
    api::{
        balance, collective_leave, contract_leave, leave_code, leave_request, leave_type, report,
        user_role,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let burst = requests_per_min.max(1);
        let per_ms = 60_000 / burst as u64;
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms.max(1))
            .burst_size(burst)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst are non-zero");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/auth/profile").route(web::get().to(handlers::profile)))
            .service(
                web::scope("/cuti")
                    // /cuti
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // static segments before /cuti/{id}
                    .service(web::resource("/balance").route(web::get().to(balance::my_balance)))
                    .service(
                        web::resource("/balance/{pegawai_id}")
                            .route(web::get().to(balance::employee_balance)),
                    )
                    .service(web::resource("/statistics").route(web::get().to(report::statistics)))
                    .service(
                        web::resource("/bawahan").route(web::get().to(leave_request::subordinate_list)),
                    )
                    // /cuti/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::patch().to(leave_request::cancel_leave)),
                    )
                    .service(
                        web::resource("/{id}/atasan")
                            .route(web::put().to(leave_request::verify_subordinate)),
                    ),
            )
            .service(
                web::scope("/cuti-kontrak")
                    .service(
                        web::resource("")
                            .route(web::get().to(contract_leave::contract_list))
                            .route(web::post().to(contract_leave::create_contract)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(contract_leave::get_contract)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(contract_leave::approve_contract)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(contract_leave::reject_contract)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::patch().to(contract_leave::cancel_contract)),
                    ),
            )
            .service(
                web::resource("/cuti-bersama")
                    .route(web::get().to(collective_leave::collective_list))
                    .route(web::post().to(collective_leave::create_collective)),
            )
            .service(
                web::resource("/cuti-bersama/{id}")
                    .route(web::delete().to(collective_leave::delete_collective)),
            )
            .service(
                web::resource("/jenis-cuti")
                    .route(web::get().to(leave_type::list_leave_types))
                    .route(web::post().to(leave_type::create_leave_type)),
            )
            .service(
                web::resource("/jenis-cuti/{id}")
                    .route(web::put().to(leave_type::update_leave_type))
                    .route(web::delete().to(leave_type::delete_leave_type)),
            )
            .service(
                web::resource("/kode-cuti")
                    .route(web::get().to(leave_code::list_codes))
                    .route(web::post().to(leave_code::create_code)),
            )
            .service(
                web::resource("/kode-cuti/{id}")
                    .route(web::patch().to(leave_code::update_code))
                    .route(web::delete().to(leave_code::delete_code)),
            )
            .service(
                web::scope("/laporan")
                    .service(web::resource("/dashboard").route(web::get().to(report::status_dashboard)))
                    .service(
                        web::resource("/cuti-bulanan").route(web::get().to(report::monthly_report)),
                    )
                    .service(
                        web::resource("/rekapitulasi").route(web::get().to(report::recapitulation)),
                    )
                    .service(web::resource("/buku/{pegawai_id}").route(web::get().to(report::leave_book))),
            )
            .service(
                web::resource("/manajemen-user")
                    .route(web::get().to(user_role::user_role_list))
                    .route(web::post().to(user_role::assign_role)),
            )
            .service(
                web::resource("/manajemen-user/{pegawai_id}/{role_id}")
                    .route(web::delete().to(user_role::remove_role)),
            ),
    );
}

// LOGIN (NIP + password)
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new pair, old refresh token revoked

// LOGOUT
//  └─ POST /auth/logout with access_token
//       └─ access jti revoked until exp, refresh tokens revoked
