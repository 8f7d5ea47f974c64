// src/storage.rs
//
// Armazenamento de arquivos (fotos) e URLs assinadas com prazo de validade.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Onde as fotos moram. A implementação padrão é o disco local; um bucket
/// externo entra implementando este trait.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;
    // Apagar chave inexistente não é erro
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Só aceita chaves relativas, sem "..", com caracteres seguros
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let safe_chars = key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));

        let path = Path::new(key);
        let only_normal = path.components().all(|c| matches!(c, Component::Normal(_)));

        if key.is_empty() || !safe_chars || !only_normal {
            return Err(AppError::NotFound("object_not_found"));
        }

        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("object_not_found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Gera e confere URLs `GET /storage/{key}?expires=..&signature=..`.
/// A assinatura é HMAC-SHA256 de `"{key}\n{expires}"`.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha256,
    public_base_url: String,
    default_ttl: Duration,
}

impl UrlSigner {
    pub fn new(secret: &[u8], public_base_url: &str, default_ttl: Duration) -> anyhow::Result<Self> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| anyhow::anyhow!("Chave de assinatura inválida: {}", e))?;

        Ok(Self {
            mac,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            default_ttl,
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn signature(&self, key: &str, expires: i64) -> String {
        let mut mac = self.mac.clone();
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// URL assinada válida até `expires_at`.
    pub fn sign(&self, key: &str, expires_at: DateTime<Utc>) -> String {
        let expires = expires_at.timestamp();
        format!(
            "{}/storage/{}?expires={}&signature={}",
            self.public_base_url,
            key,
            expires,
            self.signature(key, expires)
        )
    }

    pub fn sign_for_default_ttl(&self, key: &str, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
        let expires_at = now + self.default_ttl;
        (self.sign(key, expires_at), expires_at)
    }

    pub fn verify(&self, key: &str, expires: i64, signature: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        if now.timestamp() >= expires {
            return Err(AppError::InvalidSignature);
        }

        let provided = hex::decode(signature).map_err(|_| AppError::InvalidSignature)?;

        let mut mac = self.mac.clone();
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac.verify_slice(&provided).map_err(|_| AppError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        UrlSigner::new(b"segredo-de-teste", "http://localhost:3000/", Duration::minutes(10)).unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        url.split(['?', '&'])
            .find_map(|part| part.strip_prefix(&format!("{name}=")))
            .unwrap()
    }

    #[test]
    fn signed_url_verifies_until_it_expires() {
        let signer = signer();
        let now = Utc::now();
        let key = "t1/albums/a1/originals/p1.jpg";
        let (url, expires_at) = signer.sign_for_default_ttl(key, now);

        assert!(url.starts_with("http://localhost:3000/storage/t1/albums/"));
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");
        assert_eq!(expires, expires_at.timestamp());

        assert!(signer.verify(key, expires, signature, now).is_ok());
        assert!(signer
            .verify(key, expires, signature, expires_at + Duration::seconds(1))
            .is_err());
    }

    #[test]
    fn signature_is_bound_to_key_and_expiry() {
        let signer = signer();
        let now = Utc::now();
        let url = signer.sign("t1/a.jpg", now + Duration::minutes(5));
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");

        assert!(signer.verify("t1/b.jpg", expires, signature, now).is_err());
        assert!(signer.verify("t1/a.jpg", expires + 60, signature, now).is_err());
        assert!(signer.verify("t1/a.jpg", expires, "zz", now).is_err());
    }

    #[test]
    fn other_secret_does_not_verify() {
        let now = Utc::now();
        let url = signer().sign("k.jpg", now + Duration::minutes(5));
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let other = UrlSigner::new(b"outro", "http://x", Duration::minutes(1)).unwrap();
        assert!(other.verify("k.jpg", expires, query_param(&url, "signature"), now).is_err());
    }

    #[test]
    fn local_store_rejects_path_traversal() {
        let store = LocalObjectStore::new("/tmp/grand-salto");
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("a/../../b").is_err());
        assert!(store.resolve("a b.jpg").is_err());
        assert!(store.resolve("t/albums/x.jpg").is_ok());
    }

    #[tokio::test]
    async fn local_store_round_trip() {
        let root = std::env::temp_dir().join(format!("grand-salto-{}", uuid::Uuid::new_v4()));
        let store = LocalObjectStore::new(&root);

        store.put("t/albums/a/p.jpg", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("t/albums/a/p.jpg").await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            store.get("t/albums/a/missing.jpg").await,
            Err(AppError::NotFound(_))
        ));

        store.delete("t/albums/a/p.jpg").await.unwrap();
        assert!(store.get("t/albums/a/p.jpg").await.is_err());
        // Segunda remoção não falha
        store.delete("t/albums/a/p.jpg").await.unwrap();

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a/b.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a/b.png"), "image/png");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }
}
