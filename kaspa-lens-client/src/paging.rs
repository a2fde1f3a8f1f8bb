use crate::ClientError;
use futures::future::try_join_all;
use std::future::Future;

// 先并发拉取前 initial_batches 页，遇到不满页即结束；否则逐页顺序拉取直到不满页
pub async fn collect_all_pages<T, F, Fut>(
    page_size: usize,
    initial_batches: usize,
    fetch: F,
) -> Result<Vec<T>, ClientError>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ClientError>>,
{
    let initial = try_join_all((0..initial_batches).map(|i| fetch(i * page_size))).await?;
    let mut all = Vec::new();

    for batch in initial {
        let len = batch.len();
        all.extend(batch);

        if len < page_size {
            return Ok(all);
        }
    }

    let mut offset = initial_batches * page_size;

    loop {
        let batch = fetch(offset).await?;
        let len = batch.len();
        all.extend(batch);

        if len < page_size {
            break;
        }

        offset += page_size;
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn fake_pages(
        total: usize,
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(usize) -> futures::future::Ready<Result<Vec<usize>, ClientError>> {
        move |offset| {
            calls.fetch_add(1, Ordering::SeqCst);
            let end = (offset + 5).min(total);
            let page = if offset >= total {
                Vec::new()
            } else {
                (offset..end).collect()
            };
            futures::future::ready(Ok(page))
        }
    }

    #[tokio::test]
    async fn test_short_initial_batch_stops_early() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let items = collect_all_pages(5, 3, fake_pages(7, Arc::clone(&calls))).await?;
        assert_eq!(items, (0..7).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_sequential_pages_after_initial_batches() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let items = collect_all_pages(5, 2, fake_pages(23, Arc::clone(&calls))).await?;
        assert_eq!(items.len(), 23);
        assert_eq!(items.last(), Some(&22));
        // 2 并发页 + 3 顺序页 (10..15, 15..20, 20..23)
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_on_empty_page() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let items = collect_all_pages(5, 1, fake_pages(10, Arc::clone(&calls))).await?;
        assert_eq!(items.len(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let result: Result<Vec<u8>, _> = collect_all_pages(5, 2, |_| {
            futures::future::ready(Err(ClientError::Malformed("not an array".to_string())))
        })
        .await;
        assert!(matches!(result, Err(ClientError::Malformed(_))));
    }
}
