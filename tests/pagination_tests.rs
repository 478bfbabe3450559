use headway::source::{self, Page, PageConfig, paginate};
use std::cell::RefCell;

fn page(range: std::ops::Range<usize>, has_next: bool) -> Page<usize> {
    Page {
        items: range.collect(),
        has_next,
    }
}

#[tokio::test]
async fn stops_when_no_next_page() {
    let config = PageConfig::default().with_limit(10);
    let offsets = RefCell::new(Vec::new());
    let items = paginate(&config, |offset, limit| {
        offsets.borrow_mut().push(offset);
        let has_next = offset < 20;
        async move { Ok(page(offset..offset + limit, has_next)) }
    })
    .await
    .unwrap();
    assert_eq!(items.len(), 30);
    assert_eq!(offsets.into_inner(), vec![0, 10, 20]);
}

#[tokio::test]
async fn stops_on_short_page() {
    let config = PageConfig::default().with_limit(10);
    let items = paginate(&config, |offset, _| async move {
        Ok(page(offset..offset + if offset == 0 { 10 } else { 4 }, true))
    })
    .await
    .unwrap();
    assert_eq!(items.len(), 14);
}

#[tokio::test]
async fn ceiling_is_enforced() {
    let config = PageConfig::default().with_limit(100).with_ceiling(250);
    let result = paginate(&config, |offset, limit| async move {
        Ok(page(offset..offset + limit, true))
    })
    .await;
    assert_eq!(
        result,
        Err(source::Error::PaginationExceeded { ceiling: 250 })
    );
}

#[tokio::test]
async fn errors_are_propagated() {
    let config = PageConfig::default();
    let result: Result<Vec<usize>, _> = paginate(&config, |_, _| async {
        Err(source::Error::UpstreamRequestFailed {
            status: 500,
            body: "boom".to_string(),
        })
    })
    .await;
    assert!(matches!(
        result,
        Err(source::Error::UpstreamRequestFailed { status: 500, .. })
    ));
}
