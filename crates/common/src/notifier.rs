use async_trait::async_trait;

/// Operator notification channel.
///
/// Delivery is best-effort: implementations log transport failures and
/// return normally. Trading logic never blocks on, or fails because of,
/// a notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str);
}
