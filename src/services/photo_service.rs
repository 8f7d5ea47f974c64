// src/services/photo_service.rs

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use rand::{thread_rng, Rng};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PhotoRepository,
    models::{
        auth::{Profile, Role},
        photos::{
            Album, CreateAlbumPayload, CreateOrderPayload, DownloadBundle, Photo, PhotoOrder, PhotoOrderDetail,
            PhotoPreview, SignedDownload, UpdateAlbumPayload,
        },
    },
    services::watermark,
    storage::{ObjectStore, UrlSigner},
};

#[derive(Clone)]
pub struct PhotoService {
    repo: PhotoRepository,
    store: Arc<dyn ObjectStore>,
    signer: UrlSigner,
    download_ttl: Duration,
    pool: PgPool,
}

// Equipe que administra álbuns e pedidos
fn manages_photos(profile: &Profile) -> bool {
    matches!(profile.role, Role::Diretora | Role::SuperAdmin)
}

pub fn photo_keys(tenant_id: Uuid, album_id: Uuid, photo_id: Uuid, extension: &str) -> (String, String) {
    let base = format!("{}/albums/{}", tenant_id, album_id);
    (
        format!("{}/originals/{}.{}", base, photo_id, extension),
        format!("{}/previews/{}.jpg", base, photo_id),
    )
}

// Melhor esforço: o erro original é o que volta para o cliente
async fn discard_objects(store: &dyn ObjectStore, keys: &[&str]) {
    for key in keys {
        if let Err(e) = store.delete(key).await {
            tracing::warn!("Falha ao remover o arquivo órfão {}: {}", key, e);
        }
    }
}

/// Token do link de download: 256 bits aleatórios em hexadecimal.
pub fn generate_download_token() -> String {
    let mut token = [0u8; 32];
    thread_rng().fill(&mut token);
    hex::encode(token)
}

/// Total do pedido: quantidade de fotos × preço unitário do álbum.
pub fn order_total(price_per_photo: Decimal, photo_count: usize) -> Decimal {
    price_per_photo * Decimal::from(photo_count as u64)
}

impl PhotoService {
    pub fn new(
        repo: PhotoRepository,
        store: Arc<dyn ObjectStore>,
        signer: UrlSigner,
        download_ttl: Duration,
        pool: PgPool,
    ) -> Self {
        Self { repo, store, signer, download_ttl, pool }
    }

    // ---
    // Álbuns
    // ---

    pub async fn create_album(&self, tenant_id: Uuid, payload: &CreateAlbumPayload) -> Result<Album, AppError> {
        self.repo.create_album(&self.pool, tenant_id, payload).await
    }

    pub async fn list_albums(&self, viewer: &Profile, tenant_id: Uuid) -> Result<Vec<Album>, AppError> {
        self.repo.list_albums(tenant_id, !manages_photos(viewer)).await
    }

    pub async fn update_album(&self, tenant_id: Uuid, id: Uuid, payload: &UpdateAlbumPayload) -> Result<Album, AppError> {
        self.repo
            .update_album(&self.pool, tenant_id, id, payload)
            .await?
            .ok_or(AppError::NotFound("album_not_found"))
    }

    // Rascunho só existe para a equipe
    async fn visible_album(&self, viewer: &Profile, tenant_id: Uuid, album_id: Uuid) -> Result<Album, AppError> {
        self.repo
            .find_album(&self.pool, tenant_id, album_id)
            .await?
            .filter(|album| album.is_published || manages_photos(viewer))
            .ok_or(AppError::NotFound("album_not_found"))
    }

    // ---
    // Fotos
    // ---

    /// Guarda o original (privado) e a prévia com marca d'água.
    pub async fn upload_photo(
        &self,
        tenant_id: Uuid,
        album_id: Uuid,
        file_name: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Photo, AppError> {
        self.repo
            .find_album(&self.pool, tenant_id, album_id)
            .await?
            .ok_or(AppError::NotFound("album_not_found"))?;

        let processed = tokio::task::spawn_blocking(move || watermark::process_upload(bytes))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de processamento de imagem: {}", e))??;

        let photo_id = Uuid::new_v4();
        let (original_key, preview_key) = photo_keys(tenant_id, album_id, photo_id, processed.extension);

        let file_name = file_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.{}", photo_id, processed.extension));

        // A linha só é confirmada depois dos arquivos; se algo falhar no meio,
        // os arquivos já escritos são apagados
        let mut tx = self.pool.begin().await?;

        let photo = self
            .repo
            .insert_photo(
                &mut *tx,
                photo_id,
                tenant_id,
                album_id,
                &original_key,
                &preview_key,
                &file_name,
                processed.width as i32,
                processed.height as i32,
            )
            .await?;

        let stored = async {
            self.store.put(&original_key, processed.original).await?;
            self.store.put(&preview_key, processed.preview).await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        }
        .await;

        if let Err(e) = stored {
            discard_objects(self.store.as_ref(), &[original_key.as_str(), preview_key.as_str()]).await;
            return Err(e);
        }

        Ok(photo)
    }

    /// Fotos do álbum com URLs de prévia assinadas e de vida curta.
    pub async fn list_photos(&self, viewer: &Profile, tenant_id: Uuid, album_id: Uuid) -> Result<Vec<PhotoPreview>, AppError> {
        self.visible_album(viewer, tenant_id, album_id).await?;

        let now = Utc::now();
        let photos = self.repo.list_photos(tenant_id, album_id).await?;

        Ok(photos
            .into_iter()
            .map(|photo| {
                let (preview_url, _) = self.signer.sign_for_default_ttl(&photo.preview_key, now);
                PhotoPreview { photo, preview_url }
            })
            .collect())
    }

    // ---
    // Pedidos
    // ---

    pub async fn create_order(&self, buyer: &Profile, tenant_id: Uuid, payload: &CreateOrderPayload) -> Result<PhotoOrderDetail, AppError> {
        let album = self.visible_album(buyer, tenant_id, payload.album_id).await?;

        // Fotos repetidas contam uma vez
        let photo_ids: Vec<Uuid> = payload
            .photo_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if photo_ids.is_empty() {
            return Err(AppError::EmptyOrder);
        }

        let mut tx = self.pool.begin().await?;

        let photos = self
            .repo
            .find_photos_in_album(&mut *tx, tenant_id, album.id, &photo_ids)
            .await?;
        if photos.len() != photo_ids.len() {
            return Err(AppError::PhotoNotInAlbum);
        }

        let total = order_total(album.price_per_photo, photo_ids.len());
        let order = self
            .repo
            .create_order(&mut *tx, tenant_id, album.id, buyer.id, total)
            .await?;
        self.repo.add_order_items(&mut *tx, order.id, &photo_ids).await?;

        tx.commit().await?;

        Ok(PhotoOrderDetail { order, album_title: album.title, photo_ids })
    }

    /// Comprador vê só os próprios pedidos; a direção vê todos.
    pub async fn list_orders(&self, viewer: &Profile, tenant_id: Uuid, mine_only: bool) -> Result<Vec<PhotoOrder>, AppError> {
        let buyer = if mine_only || !manages_photos(viewer) { Some(viewer.id) } else { None };
        self.repo.list_orders(tenant_id, buyer).await
    }

    pub async fn get_order(&self, viewer: &Profile, tenant_id: Uuid, id: Uuid) -> Result<PhotoOrderDetail, AppError> {
        let order = self
            .repo
            .find_order(&self.pool, tenant_id, id)
            .await?
            .filter(|o| o.buyer_id == viewer.id || manages_photos(viewer))
            .ok_or(AppError::NotFound("order_not_found"))?;

        let album_title = self.repo.album_title(&self.pool, order.album_id).await?;
        let photo_ids = self
            .repo
            .order_photos(&self.pool, order.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        Ok(PhotoOrderDetail { order, album_title, photo_ids })
    }

    /// Pagamento confirmado manualmente: libera o link por `download_ttl`.
    pub async fn confirm_payment(&self, tenant_id: Uuid, id: Uuid) -> Result<PhotoOrder, AppError> {
        let token = generate_download_token();
        let expires_at = Utc::now() + self.download_ttl;

        match self.repo.mark_paid(&self.pool, tenant_id, id, &token, expires_at).await? {
            Some(order) => {
                tracing::info!("💰 Pedido {} pago; download liberado até {}", order.id, expires_at);
                Ok(order)
            }
            None => Err(self.not_pending_or_missing(tenant_id, id).await?),
        }
    }

    pub async fn cancel_order(&self, viewer: &Profile, tenant_id: Uuid, id: Uuid) -> Result<PhotoOrder, AppError> {
        let order = self
            .repo
            .find_order(&self.pool, tenant_id, id)
            .await?
            .filter(|o| o.buyer_id == viewer.id || manages_photos(viewer))
            .ok_or(AppError::NotFound("order_not_found"))?;

        match self.repo.cancel_order(&self.pool, tenant_id, order.id).await? {
            Some(order) => Ok(order),
            None => Err(AppError::OrderNotPending),
        }
    }

    async fn not_pending_or_missing(&self, tenant_id: Uuid, id: Uuid) -> Result<AppError, AppError> {
        Ok(match self.repo.find_order(&self.pool, tenant_id, id).await? {
            Some(_) => AppError::OrderNotPending,
            None => AppError::NotFound("order_not_found"),
        })
    }

    // ---
    // Download público (link com token)
    // ---

    async fn authorized_order(&self, order_id: Uuid, token: &str, now: DateTime<Utc>) -> Result<PhotoOrder, AppError> {
        let order = self
            .repo
            .find_order_by_id(order_id)
            .await?
            .ok_or(AppError::NotFound("order_not_found"))?;

        if let Err(e) = order.authorize_download(token, now) {
            tracing::warn!("Download recusado para o pedido {}: {}", order_id, e);
            return Err(e);
        }

        Ok(order)
    }

    // A URL assinada nunca vive mais que o próprio link do pedido
    fn sign_original(&self, order: &PhotoOrder, photo: &Photo, now: DateTime<Utc>) -> SignedDownload {
        let mut expires_at = now + self.signer.default_ttl();
        if let Some(link_expiry) = order.download_expires_at {
            expires_at = expires_at.min(link_expiry);
        }

        SignedDownload {
            photo_id: photo.id,
            file_name: photo.file_name.clone(),
            url: self.signer.sign(&photo.original_key, expires_at),
            expires_at,
        }
    }

    pub async fn download_bundle(&self, order_id: Uuid, token: &str) -> Result<DownloadBundle, AppError> {
        let now = Utc::now();
        let order = self.authorized_order(order_id, token, now).await?;
        let photos = self.repo.order_photos(&self.pool, order.id).await?;

        let files = photos.iter().map(|p| self.sign_original(&order, p, now)).collect();

        Ok(DownloadBundle {
            order_id: order.id,
            // authorize_download garante que existe
            link_expires_at: order.download_expires_at.unwrap_or(now),
            files,
        })
    }

    pub async fn download_photo(&self, order_id: Uuid, photo_id: Uuid, token: &str) -> Result<SignedDownload, AppError> {
        let now = Utc::now();
        let order = self.authorized_order(order_id, token, now).await?;

        let photos = self.repo.order_photos(&self.pool, order.id).await?;
        let photo = photos
            .iter()
            .find(|p| p.id == photo_id)
            .ok_or(AppError::NotFound("photo_not_found"))?;

        Ok(self.sign_original(&order, photo, now))
    }

    /// Entrega do arquivo por trás de `/storage/{key}`.
    pub async fn fetch_signed_object(&self, key: &str, expires: i64, signature: &str) -> Result<Vec<u8>, AppError> {
        self.signer.verify(key, expires, signature, Utc::now())?;
        self.store.get(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalObjectStore;

    #[test]
    fn download_tokens_are_long_and_unique() {
        let a = generate_download_token();
        let b = generate_download_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn total_is_count_times_price() {
        assert_eq!(order_total(Decimal::new(1500, 2), 3), Decimal::new(4500, 2));
        assert_eq!(order_total(Decimal::new(1500, 2), 0), Decimal::ZERO);
    }

    #[tokio::test]
    async fn failed_upload_leaves_no_files_behind() {
        let root = std::env::temp_dir().join(format!("grand-salto-{}", Uuid::new_v4()));
        let store = LocalObjectStore::new(&root);
        let (original, preview) = photo_keys(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "jpg");

        // Só o original chegou a ser escrito
        store.put(&original, vec![1, 2, 3]).await.unwrap();
        discard_objects(&store, &[original.as_str(), preview.as_str()]).await;

        assert!(store.get(&original).await.is_err());
        assert!(store.get(&preview).await.is_err());

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn keys_are_scoped_and_keep_the_original_extension() {
        let (t, a, p) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (original, preview) = photo_keys(t, a, p, "png");
        assert_eq!(original, format!("{t}/albums/{a}/originals/{p}.png"));
        assert_eq!(preview, format!("{t}/albums/{a}/previews/{p}.jpg"));
    }
}
