use crate::client::PaymentClient;
use std::sync::atomic::Ordering;
use tracing::{error, info};

/// Arranca el supervisor de conectividad en segundo plano.
///
/// Es exactamente una tarea de larga vida: si ya hay un supervisor activo
/// la llamada es un no-op (reconectar no debe duplicar la tarea, porque
/// dos supervisores reenviarian los pendientes dos veces). Cada tick:
/// sondear el canal, reconectar si esta roto, y si hay sesion y cola no
/// vacia, reenviar los pagos pendientes en serie.
pub fn start_connectivity_monitor(client: &PaymentClient) {
    if client.inner.monitor_running.swap(true, Ordering::SeqCst) {
        return;
    }
    client.inner.stop_monitor.store(false, Ordering::SeqCst);

    let monitor = client.clone();
    let handle = tokio::spawn(async move {
        monitor_loop(monitor).await;
    });

    *client
        .inner
        .monitor_task
        .lock()
        .expect("monitor task lock poisoned") = Some(handle);
}

/// Frena el supervisor. El flag de stop cubre el tick en curso y el abort
/// corta el sleep entre ticks.
pub fn stop_connectivity_monitor(client: &PaymentClient) {
    client.inner.stop_monitor.store(true, Ordering::SeqCst);

    if let Some(handle) = client
        .inner
        .monitor_task
        .lock()
        .expect("monitor task lock poisoned")
        .take()
    {
        handle.abort();
        info!("Stopped connectivity monitor");
    }

    client.inner.monitor_running.store(false, Ordering::SeqCst);
}

pub fn is_monitor_running(client: &PaymentClient) -> bool {
    client.inner.monitor_running.load(Ordering::SeqCst)
}

async fn monitor_loop(client: PaymentClient) {
    let interval = client.inner.config.check_interval;

    loop {
        tokio::time::sleep(interval).await;

        if client.inner.stop_monitor.load(Ordering::SeqCst) {
            break;
        }

        // 1. Sondear el canal; si esta roto, cerrar y reabrir
        if !client.is_connected() || !client.probe().await {
            client.reconnect().await;
        }

        // 2. Con sesion activa, drenar la cola de pendientes
        if client.is_connected()
            && client.token().is_some()
            && client.inner.queue.has_pending()
        {
            match client.retry_pending().await {
                Ok(report) => {
                    if report.retried > 0 {
                        info!("{}", report);
                    }
                }
                Err(e) => error!("Pending replay failed: {}", e),
            }
        }
    }

    client.inner.monitor_running.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;

    fn client() -> PaymentClient {
        let dir = tempdir().unwrap();
        let config = ClientConfig {
            gateway_addr: "https://localhost:1".to_string(),
            cert_dir: PathBuf::from("certificate"),
            tls_domain: "localhost".to_string(),
            pending_dir: dir.path().to_path_buf(),
            check_interval: Duration::from_secs(3600),
        };
        std::mem::forget(dir);
        PaymentClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_starting_twice_keeps_a_single_supervisor() {
        let client = client();

        start_connectivity_monitor(&client);
        let first_handle_exists = client
            .inner
            .monitor_task
            .lock()
            .unwrap()
            .is_some();

        // Segunda llamada: no-op, no pisa la tarea existente
        start_connectivity_monitor(&client);

        assert!(first_handle_exists);
        assert!(is_monitor_running(&client));

        stop_connectivity_monitor(&client);
        assert!(!is_monitor_running(&client));
    }

    #[tokio::test]
    async fn test_stop_then_start_spawns_fresh_supervisor() {
        let client = client();

        start_connectivity_monitor(&client);
        stop_connectivity_monitor(&client);
        assert!(!is_monitor_running(&client));

        start_connectivity_monitor(&client);
        assert!(is_monitor_running(&client));

        stop_connectivity_monitor(&client);
    }
}
