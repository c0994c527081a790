//! Service Container - Centralized service access with parallel execution support.
//!
//! Wires every storefront service over one persistence layer and hands
//! them out as trait objects.

use std::future::Future;
use std::sync::Arc;

use super::{
    AdminManager, AdminService, AuthService, Authenticator, CosmeticManager, CosmeticService,
    ImageManager, ImageService, ModpackBuilder, ModpackService, OrderManager, OrderService,
    PaymentManager, PaymentService, PlayerManager, PlayerService, ProductManager, ProductService,
    StockManager, StockService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{CatalogCache, ImageStore, ModrinthClient, Persistence, StripeClient};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Player login links and session tokens
    fn auth(&self) -> Arc<dyn AuthService>;

    fn admins(&self) -> Arc<dyn AdminService>;

    fn players(&self) -> Arc<dyn PlayerService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn stocks(&self) -> Arc<dyn StockService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    /// Stripe checkout and webhook fulfilment
    fn payments(&self) -> Arc<dyn PaymentService>;

    fn cosmetics(&self) -> Arc<dyn CosmeticService>;

    fn images(&self) -> Arc<dyn ImageService>;

    fn modpack(&self) -> Arc<dyn ModpackService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    admins: Arc<dyn AdminService>,
    players: Arc<dyn PlayerService>,
    products: Arc<dyn ProductService>,
    stocks: Arc<dyn StockService>,
    orders: Arc<dyn OrderService>,
    payments: Arc<dyn PaymentService>,
    cosmetics: Arc<dyn CosmeticService>,
    images: Arc<dyn ImageService>,
    modpack: Arc<dyn ModpackService>,
}

impl Services {
    /// Build every service over a database connection.
    ///
    /// Fails only when the login-link cipher cannot be derived from the
    /// configured encryption password.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        cache: Arc<dyn CatalogCache>,
    ) -> AppResult<Self> {
        let uow = Arc::new(Persistence::new(db));
        let images = ImageStore::new(config.image_dir.clone());
        let gateway = Arc::new(StripeClient::new(&config));
        let pack_source = Arc::new(ModrinthClient::new(&config));

        Ok(Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config.clone())?),
            admins: Arc::new(AdminManager::new(uow.clone(), config.clone())),
            players: Arc::new(PlayerManager::new(uow.clone())),
            products: Arc::new(ProductManager::new(uow.clone(), images.clone(), cache.clone())),
            stocks: Arc::new(StockManager::new(uow.clone(), cache.clone())),
            orders: Arc::new(OrderManager::new(uow.clone())),
            payments: Arc::new(PaymentManager::new(uow.clone(), gateway, cache.clone(), config)),
            cosmetics: Arc::new(CosmeticManager::new(uow)),
            images: Arc::new(ImageManager::new(images, cache)),
            modpack: Arc::new(ModpackBuilder::new(pack_source)),
        })
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn admins(&self) -> Arc<dyn AdminService> {
        self.admins.clone()
    }

    fn players(&self) -> Arc<dyn PlayerService> {
        self.players.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.products.clone()
    }

    fn stocks(&self) -> Arc<dyn StockService> {
        self.stocks.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.orders.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payments.clone()
    }

    fn cosmetics(&self) -> Arc<dyn CosmeticService> {
        self.cosmetics.clone()
    }

    fn images(&self) -> Arc<dyn ImageService> {
        self.images.clone()
    }

    fn modpack(&self) -> Arc<dyn ModpackService> {
        self.modpack.clone()
    }
}

/// Helpers for running independent lookups concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Run two independent operations; fails fast on the first error.
    ///
    /// # Example
    /// ```ignore
    /// let (stocks, images) = parallel::join2(
    ///     uow.stocks().list_for_products(ids),
    ///     images.list(&name),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Run homogeneous operations concurrently. Results keep input order.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }

    /// Run operations with at most `limit` in flight.
    ///
    /// Results arrive in completion order, not input order.
    pub async fn join_all_limited<F, T, I>(futures: I, limit: usize) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
        I: IntoIterator<Item = F>,
    {
        use futures::stream::{self, StreamExt};

        stream::iter(futures)
            .buffer_unordered(limit.max(1))
            .collect::<Vec<AppResult<T>>>()
            .await
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn stock() -> AppResult<i64> {
            Ok(4)
        }
        async fn images() -> AppResult<Vec<String>> {
            Ok(vec!["/api/products/images/Hoodie/1.webp".to_string()])
        }

        let (quantity, urls) = parallel::join2(stock(), images()).await.unwrap();
        assert_eq!(quantity, 4);
        assert_eq!(urls.len(), 1);
    }

    #[tokio::test]
    async fn test_parallel_join_all_keeps_order() {
        let futures: Vec<_> = (0..5).map(|i| async move { Ok(i) as AppResult<i32> }).collect();
        let results = parallel::join_all(futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_parallel_join_all_limited_collects_everything() {
        let mut results = parallel::join_all_limited(
            (0..20).map(|i| async move { Ok(i) as AppResult<i32> }),
            3,
        )
        .await
        .unwrap();
        results.sort();
        assert_eq!(results, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_parallel_join_all_limited_propagates_errors() {
        let result = parallel::join_all_limited(
            (0..4).map(|i| async move {
                if i == 2 {
                    Err(AppError::upstream("mod download failed"))
                } else {
                    Ok(i)
                }
            }),
            2,
        )
        .await;
        assert!(result.is_err());
    }
}
