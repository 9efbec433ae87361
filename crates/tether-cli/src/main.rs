use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

use tether_core::TaskAdapter;
use tether_core::diagnostics::EnvironmentReport;
use tether_core::impls::InMemoryTask;
use tether_core::ports::NativeTask;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    // 環境診断（ログのみ、制御フローには影響しない）
    EnvironmentReport::collect().log();

    // (A) 偽のネイティブタスクを用意（本番では外部ランタイムが生成する）
    let task: Arc<InMemoryTask<i32>> = Arc::new(InMemoryTask::new());
    println!("wrapping native task: {}", task.id());

    // (B) adapter で包んで、コールバックを登録
    let adapter = TaskAdapter::new(Some(Arc::clone(&task) as Arc<dyn NativeTask<i32>>))
        .expect("task reference is set");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let tx_ok = tx.clone();
    adapter.on_success(move |value: &i32| {
        let _ = tx_ok.send(Ok(*value));
    });
    adapter.on_failure(move |message: &str, code: i32| {
        let _ = tx.send(Err((message.to_string(), code)));
    });

    // (C) ランタイム側の完了を別コンテキストから配送する
    let _delivery = task.resolve_after(Duration::from_millis(50), 42);

    // (D) callback 経由で結果を待つ（adapter 自体は一切ブロックしない）
    match rx.recv().await {
        Some(Ok(value)) => println!("resolved: {value}"),
        Some(Err((message, code))) => println!("failed: code={code} message={message}"),
        None => println!("no completion delivered"),
    }

    // (E) release（Drop でも解放されるが、デモなので明示的に）
    adapter.release();
    adapter.release(); // idempotent: ネイティブ側には一度しか届かない
    println!(
        "counts: {}",
        serde_json::json!({
            "release_calls": task.release_calls(),
            "tickets_dropped": task.tickets_dropped(),
            "success_listeners": task.success_listeners(),
        })
    );
}
