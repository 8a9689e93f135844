use chrono::{Days, Local};
use courtesy_cal::{
    calendar::{Checklist, EventDraft, EventType, format_date},
    sync::sync_engine::StoreClient,
};

/// Seeds a few events around today into an empty store.
pub async fn add_sample_events(store: &StoreClient) -> usize {
    match store.snapshot().await {
        Ok(existing) if !existing.is_empty() => {
            tracing::info!("Sample data skipped: store already has {} events", existing.len());
            return 0;
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Sample data skipped: {}", e);
            return 0;
        }
    }

    let today = Local::now().date_naive();
    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else { return 0 };
    let Some(in_three_days) = today.checked_add_days(Days::new(3)) else { return 0 };
    let Some(next_week) = today.checked_add_days(Days::new(7)) else { return 0 };

    let all_done = Checklist { wreath: true, money: true, telegram: true };
    let samples = vec![
        EventDraft::new("한빛상사", EventType::Wedding, format_date(today))
            .with_note("김 부장 장남 결혼식, 웨딩홀 3층")
            .with_checklist(Checklist { wreath: true, ..Checklist::default() }),
        EventDraft::new("Blue Cafe", EventType::Opening, format_date(today)),
        EventDraft::new("대성물산", EventType::Funeral, format_date(yesterday))
            .with_note("발인 내일 오전")
            .with_checklist(all_done)
            .with_completed(true),
        EventDraft::new("ACME Korea", EventType::Wedding, format_date(in_three_days)),
        EventDraft::new("미래테크", EventType::Other, format_date(next_week))
            .with_note("창립 20주년"),
    ];

    let mut created = 0;
    for draft in samples {
        if store.create(draft).await {
            created += 1;
        }
    }
    tracing::info!("Seeded {} sample events", created);
    created
}
