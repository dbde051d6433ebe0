//! Pressgate CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 사용자 7번의 Claim 토큰 발급 (auth.claim_ttl_secs 사용)
//! pressgate token issue --user-id 7 --email alice@x.com
//!
//! # 1시간짜리 토큰
//! pressgate token issue --user-id 7 --email alice@x.com --ttl-secs 3600
//!
//! # 토큰 서명/만료 검사
//! pressgate token inspect eyJhbGciOi...
//!
//! # 라우트별 인증 정책 확인
//! pressgate routes
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use pressgate_core::{init_logging, AppConfig, AuthConfig};
use secrecy::SecretString;
use tracing::{error, info};

mod commands;

use commands::routes::{print_routes, route_rows};
use commands::token::{inspect_token, issue_token, IssueConfig};

#[derive(Parser)]
#[command(name = "pressgate")]
#[command(about = "Pressgate CLI - 토큰 발급/검사 및 라우트 정책 확인", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// 서명 키 (설정 파일/환경 변수보다 우선)
    #[arg(long, global = true, env = "PRESSGATE_JWT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// JSON으로 출력
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Claim 토큰 관리
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// 라우트별 permission key와 해석된 정책 출력
    Routes,
}

#[derive(Subcommand)]
enum TokenAction {
    /// 서명된 Claim 토큰 발급
    Issue {
        /// 사용자 ID
        #[arg(short, long)]
        user_id: u64,

        /// 사용자 이메일
        #[arg(short, long)]
        email: String,

        /// nicename (기본: 이메일 로컬 파트)
        #[arg(long)]
        nicename: Option<String>,

        /// 표시 이름 (기본: nicename)
        #[arg(long)]
        display_name: Option<String>,

        /// 이름
        #[arg(long)]
        first_name: Option<String>,

        /// 유효 기간(초). 기본: auth.claim_ttl_secs
        #[arg(long)]
        ttl_secs: Option<i64>,
    },

    /// 토큰 서명과 만료 검사
    Inspect {
        /// 검사할 토큰 ("Bearer " 접두사 허용)
        token: String,
    },
}

fn load_auth_config(path: Option<&str>, secret: Option<String>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("설정 파일을 읽을 수 없습니다: {}", path))?,
        None => AppConfig::load_default().context("기본 설정 로드 실패")?,
    };

    if let Some(secret) = secret {
        config.auth.jwt_secret = SecretString::new(secret.into_boxed_str());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_auth_config(cli.config.as_deref(), cli.secret.clone())?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Token { action } => run_token(action, &config.auth, cli.json)?,

        Commands::Routes => {
            let rows = route_rows();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_routes(&rows);
            }
        }
    }

    Ok(())
}

fn run_token(action: TokenAction, auth: &AuthConfig, json: bool) -> anyhow::Result<()> {
    let now = chrono::Utc::now().timestamp();

    match action {
        TokenAction::Issue {
            user_id,
            email,
            nicename,
            display_name,
            first_name,
            ttl_secs,
        } => {
            let config = IssueConfig {
                user_id,
                email,
                nicename,
                display_name,
                first_name,
                ttl_secs,
            };

            match issue_token(auth, &config, now) {
                Ok(token) => {
                    if json {
                        println!("{}", serde_json::json!({ "token": token }));
                    } else {
                        println!("{}", token);
                    }
                }
                Err(e) => {
                    error!("Token issue failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        TokenAction::Inspect { token } => {
            let report = inspect_token(auth, &token, now);
            info!(status = %report.status, "Token inspected");

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match &report.claims {
                    Some(claims) => {
                        println!("상태: {}", report.status);
                        println!("사용자: {} ({})", claims.user_id, claims.user_email);
                        println!("nicename: {}", claims.user_nicename);
                        println!("발급: {}", format_ts(claims.issued_at));
                        println!("만료: {}", format_ts(claims.expires_at));
                        if let Some(remaining) = report.expires_in_secs {
                            println!("남은 시간: {}초", remaining);
                        }
                    }
                    None => println!("❌ 유효하지 않은 토큰: {}", report.status),
                }
            }

            if !report.is_valid() {
                anyhow::bail!("token is not valid: {}", report.status);
            }
        }
    }

    Ok(())
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
