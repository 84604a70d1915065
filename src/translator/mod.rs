//! 翻訳オーケストレーション
//!
//! - batcher: 選択行を固定サイズのバッチに分割
//! - worker_pool: ファイル内のバッチを並列に処理
//! - controller: 実行全体（前提条件・ファイル順・進捗）
//! - progress: 実行全体の進捗カウンタ

mod batcher;
mod controller;
mod progress;
mod worker_pool;

pub use batcher::{make_batches, Batch, BatchItem};
pub use controller::{FileRunReport, Orchestrator, RunReport, RunState};
pub use progress::{GlobalProgress, ProgressObserver, ProgressSnapshot};
pub use worker_pool::{PoolReport, WorkerPool};
