use tokio::signal;
use tracing::warn;

/// 阻塞等待 Ctrl+C，随后由 main 的 select! 结束服务器
pub async fn listen_for_shutdown() {
    signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
    warn!("Shutdown signal received, stopping score service...");
}
