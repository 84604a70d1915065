//! 実行全体の進捗カウンタ

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub current: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.current as f64 * 100.0 / self.total as f64
    }
}

/// 進捗通知のコールバック
pub type ProgressObserver = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// 全ワーカーで共有する進捗
///
/// `current` は加算のみなので、観測値は単調増加する。
/// 通知は `delivery` を握ったまま行い、届く順序も単調にする。
#[derive(Debug, Default)]
pub struct GlobalProgress {
    current: AtomicUsize,
    total: AtomicUsize,
    delivery: Mutex<()>,
}

impl GlobalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// 実行開始時に母数を固定する
    pub fn reset(&self, total: usize) -> ProgressSnapshot {
        self.total.store(total, Ordering::SeqCst);
        self.current.store(0, Ordering::SeqCst);
        ProgressSnapshot { current: 0, total }
    }

    /// バッチ処理済みの行数を加算
    pub fn advance(&self, count: usize) -> ProgressSnapshot {
        let current = self.current.fetch_add(count, Ordering::SeqCst) + count;
        ProgressSnapshot {
            current,
            total: self.total.load(Ordering::SeqCst),
        }
    }

    /// 加算と通知をひとまとめに行う
    pub fn advance_and_notify(&self, count: usize, observer: Option<&ProgressObserver>) -> ProgressSnapshot {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.advance(count);
        if let Some(observer) = observer {
            observer(snapshot);
        }
        snapshot
    }

    pub fn reset_and_notify(&self, total: usize, observer: Option<&ProgressObserver>) -> ProgressSnapshot {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.reset(total);
        if let Some(observer) = observer {
            observer(snapshot);
        }
        snapshot
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            current: self.current.load(Ordering::SeqCst),
            total: self.total.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_and_advance() {
        let progress = GlobalProgress::new();
        progress.reset(30);
        assert_eq!(progress.advance(14), ProgressSnapshot { current: 14, total: 30 });
        assert_eq!(progress.advance(2).current, 16);

        progress.reset(5);
        assert_eq!(progress.snapshot(), ProgressSnapshot { current: 0, total: 5 });
    }

    /// 通知の途中で他スレッドが加算しても、届く値は逆転しない
    #[test]
    fn test_notifications_arrive_in_order() {
        let progress = Arc::new(GlobalProgress::new());
        progress.reset(8);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer: ProgressObserver = {
            let seen = Arc::clone(&seen);
            Arc::new(move |snapshot: ProgressSnapshot| {
                if snapshot.current % 2 == 1 {
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
                seen.lock().unwrap().push(snapshot.current);
            })
        };

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let progress = Arc::clone(&progress);
                let observer = Arc::clone(&observer);
                std::thread::spawn(move || {
                    for _ in 0..2 {
                        progress.advance_and_notify(1, Some(&observer));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_percent() {
        assert_eq!(ProgressSnapshot { current: 0, total: 0 }.percent(), 100.0);
        assert_eq!(ProgressSnapshot { current: 1, total: 4 }.percent(), 25.0);
    }
}
