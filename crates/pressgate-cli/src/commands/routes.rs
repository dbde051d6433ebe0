//! 라우트 정책 목록 출력.

use pressgate_api::auth::{Policy, PolicyRegistry};
use pressgate_api::route_table;
use serde::Serialize;

/// 라우트 한 줄.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRow {
    pub method: String,
    pub path: &'static str,
    pub permission: Option<&'static str>,
    /// "open" | "identity_required"
    pub policy: &'static str,
    /// permission key가 선언됐지만 등록되지 않아 인증 없이 동작하는 라우트
    pub unresolved: bool,
}

/// 선언된 전체 라우트와 해석된 정책.
pub fn route_rows() -> Vec<RouteRow> {
    let registry = PolicyRegistry::default();

    route_table()
        .iter()
        .map(|decl| {
            let policy = registry.resolve(decl.permission);
            RouteRow {
                method: decl.method.to_string(),
                path: decl.path,
                permission: decl.permission,
                policy: match policy {
                    Policy::Open => "open",
                    Policy::IdentityRequired => "identity_required",
                },
                unresolved: decl.permission.is_some() && policy == Policy::Open,
            }
        })
        .collect()
}

/// 표 형식 출력.
pub fn print_routes(rows: &[RouteRow]) {
    println!("{:<7} {:<20} {:<20} POLICY", "METHOD", "PATH", "PERMISSION");
    println!("{}", "-".repeat(68));
    for row in rows {
        let marker = if row.unresolved { "  ⚠️  unknown key" } else { "" };
        println!(
            "{:<7} {:<20} {:<20} {}{}",
            row.method,
            row.path,
            row.permission.unwrap_or("-"),
            row.policy,
            marker
        );
    }
}
