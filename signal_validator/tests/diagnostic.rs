mod common;

use chrono::Duration;
use chrono_tz::America::New_York;
use common::*;
use market_data_ingestor::models::bar::Bar;
use signal_validator::{Direction, SignalError, diagnostic::MacdOutcome};

#[tokio::test]
async fn stale_crossover_on_primary_rejects_despite_matching_macd() {
    let v = validator(CannedProvider::new().with("15Min", crossover_bars()));
    // crossover at 18:00Z, moment 200 minutes later
    let moment = utc(2025, 3, 3, 21, 20).with_timezone(&New_York);

    let outcome = v
        .try_diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call)
        .await
        .unwrap();
    match outcome {
        MacdOutcome::StaleCrossover { crossover, minutes } => {
            assert_eq!(crossover.direction, Direction::Call);
            assert_eq!(crossover.timestamp, utc(2025, 3, 3, 18, 0).with_timezone(&New_York));
            assert_eq!(minutes, 200);
        }
        other => panic!("expected stale crossover, got {other:?}"),
    }
    assert!(!v.diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call).await);
}

#[tokio::test]
async fn crossover_exactly_at_max_age_is_still_fresh() {
    let v = validator(CannedProvider::new().with("15Min", crossover_bars()));
    let moment = utc(2025, 3, 3, 18, 0).with_timezone(&New_York) + Duration::minutes(180);

    let outcome = v
        .try_diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call)
        .await
        .unwrap();
    assert!(matches!(outcome, MacdOutcome::Confirmed { .. }), "{outcome:?}");
}

#[tokio::test]
async fn crossover_past_max_age_by_seconds_is_stale() {
    let v = validator(CannedProvider::new().with("15Min", crossover_bars()));
    let crossed = utc(2025, 3, 3, 18, 0).with_timezone(&New_York);

    for (age, reported) in [
        (Duration::minutes(180) + Duration::seconds(30), 180),
        (Duration::minutes(181), 181),
    ] {
        let outcome = v
            .try_diagnose_macd("AAPL", tf("15Min"), crossed + age, Direction::Call)
            .await
            .unwrap();
        match outcome {
            MacdOutcome::StaleCrossover { minutes, .. } => assert_eq!(minutes, reported),
            other => panic!("expected stale crossover at {age}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn fresh_crossover_confirms_matching_direction_only() {
    let v = validator(CannedProvider::new().with("15Min", crossover_bars()));
    let moment = utc(2025, 3, 3, 19, 40).with_timezone(&New_York);

    let outcome = v
        .try_diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call)
        .await
        .unwrap();
    let MacdOutcome::Confirmed { macd, signal } = outcome else {
        panic!("expected confirmation, got {outcome:?}");
    };
    assert!(macd > signal);

    assert!(v.diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call).await);
    assert!(!v.diagnose_macd("AAPL", tf("15Min"), moment, Direction::Put).await);
}

#[tokio::test]
async fn staleness_only_applies_to_primary_timeframe() {
    let v = validator(CannedProvider::new().with("5Min", crossover_bars()));
    let moment = utc(2025, 3, 3, 21, 20).with_timezone(&New_York);
    assert!(v.diagnose_macd("AAPL", tf("5Min"), moment, Direction::Call).await);
}

#[tokio::test]
async fn request_window_ends_one_minute_before_the_bucket() {
    let provider = CannedProvider::new().with("15Min", crossover_bars());
    let v = validator(provider);
    // 14:40:27 EST
    let moment = utc(2025, 3, 3, 19, 40).with_timezone(&New_York) + Duration::seconds(27);
    v.diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call).await;

    let requests = v.provider().requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.symbols, vec!["AAPL".to_string()]);
    assert_eq!(req.timeframe, tf("15Min"));
    assert_eq!(req.end, utc(2025, 3, 3, 19, 29));
    assert_eq!(req.start, utc(2025, 3, 3, 9, 29));
}

#[tokio::test]
async fn fewer_than_35_bars_is_false() {
    let mut bars = crossover_bars();
    bars.truncate(34);
    let v = validator(CannedProvider::new().with("5Min", bars));
    let moment = utc(2025, 3, 3, 19, 0).with_timezone(&New_York);

    let err = v
        .try_diagnose_macd("AAPL", tf("5Min"), moment, Direction::Put)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SignalError::InsufficientData { needed: 35, got: 34, .. }
    ));
    assert!(!v.diagnose_macd("AAPL", tf("5Min"), moment, Direction::Put).await);
}

#[tokio::test]
async fn incomplete_bars_do_not_count() {
    let mut bars = crossover_bars();
    bars.truncate(36);
    bars[10] = Bar::ohlc(bars[10].timestamp, f64::NAN, 1.0, 0.0, 0.5);
    bars[20].close = f64::INFINITY;
    let v = validator(CannedProvider::new().with("5Min", bars));
    let moment = utc(2025, 3, 3, 19, 0).with_timezone(&New_York);

    let err = v
        .try_diagnose_macd("AAPL", tf("5Min"), moment, Direction::Call)
        .await
        .unwrap_err();
    assert!(matches!(err, SignalError::InsufficientData { got: 34, .. }));
}

#[tokio::test]
async fn symbol_without_data_is_false() {
    let v = validator(CannedProvider::new());
    let moment = utc(2025, 3, 3, 19, 0).with_timezone(&New_York);
    assert!(!v.diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call).await);
}

#[tokio::test]
async fn transport_fault_is_false() {
    let v = validator(FailingProvider);
    let moment = utc(2025, 3, 3, 19, 0).with_timezone(&New_York);

    let err = v
        .try_diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
    assert!(!v.diagnose_macd("AAPL", tf("15Min"), moment, Direction::Call).await);
}
