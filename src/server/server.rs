use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let user_repo: Arc<dyn UserRepo> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryUserRepo::new()),
            "mysql" => {
                let dsn = settings.store.mysql_dsn.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("store.mysql_dsn is required for the mysql backend")
                })?;
                let pool = Pool::<MySql>::connect(dsn).await?;
                Arc::new(MySqlUserRepo::new(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher {});
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            access_secret: settings.auth.access_token_secret.clone().into_bytes(),
            refresh_secret: settings.auth.refresh_token_secret.clone().into_bytes(),
            access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.auth.refresh_ttl_secs),
        }));
        let session_store: Arc<dyn SessionStore> = Arc::new(RepoSessionStore::new(
            user_repo.clone(),
            token_codec.clone(),
        ));

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            "real" => Arc::new(RealAuthService::new(
                user_repo,
                credential_hasher,
                token_codec,
                session_store,
            )),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        info!("server started");

        Ok(Self { auth_service })
    }
}
