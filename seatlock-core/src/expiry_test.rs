#[cfg(test)]
mod tests {
    use crate::expiry::ExpiryTimer;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::runtime::Handle;

    fn counting_timer(fired: &Arc<AtomicUsize>, delay: Duration) -> ExpiryTimer {
        let fired = Arc::clone(fired);
        ExpiryTimer::arm(&Handle::current(), delay, 42, move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_once_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = counting_timer(&fired, Duration::from_millis(500));
        assert_eq!(timer.deadline(), 42);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = counting_timer(&fired, Duration::from_millis(500));

        tokio::time::sleep(Duration::from_millis(100)).await;
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_timer_cancels_previous() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut slot = Some(counting_timer(&fired, Duration::from_millis(100)));
        assert!(slot.as_ref().is_some_and(|timer| !timer.is_finished()));

        slot = Some(counting_timer(&fired, Duration::from_millis(300)));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        drop(slot);
    }
}
