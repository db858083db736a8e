mod mock;

use mock::{Event, FixedClock, MockConnector, MockLink, Shared, http_response, record, watchdog};
use rand::Rng;
use roomlink::ReportError;
use roomlink::config::{DeviceConfig, PushConfig, WifiCredentials};
use roomlink::network::error::Error;
use roomlink::report::{ReportOutcome, StatusReporter};
use roomlink::room::{DeviceState, ROOM_COUNT, RoomState};

const BACKEND: &str = "http://10.0.0.5:8000/api/restroom/status";

fn config() -> DeviceConfig {
    DeviceConfig::new(
        "wc-floor2",
        BACKEND,
        WifiCredentials::new("site-iot", "hunter22").unwrap(),
        PushConfig::new("token", "U123").unwrap(),
    )
    .unwrap()
}

fn loaded_state() -> DeviceState {
    DeviceState {
        rooms: [
            RoomState {
                occupied: true,
                use_count: 4,
                total_use_ms: 240_000,
                door_closed: true,
            },
            RoomState::default(),
            RoomState {
                occupied: false,
                use_count: 9,
                total_use_ms: 610_500,
                door_closed: false,
            },
        ],
        cleaning_required: false,
        last_clean_ts_ms: 1_700_000,
        counters_loaded: true,
    }
}

fn reporter(
    connector: MockConnector,
    state: DeviceState,
) -> StatusReporter<MockConnector, DeviceState, FixedClock> {
    StatusReporter::new(&config(), connector, state, FixedClock(2_000_000)).unwrap()
}

fn run(record: &Shared, response: Vec<u8>) -> (ReportOutcome, bool) {
    let mut reporter = reporter(MockConnector::responding(record, response), loaded_state());
    let link = MockLink::up(record);
    let mut wd = watchdog(record);
    let outcome = reporter.report_status(&link, &mut wd);
    (outcome, reporter.backend_ok())
}

#[test]
fn accepted_with_reference_ack() {
    let record = record();
    let (outcome, backend_ok) = run(&record, http_response(200, r#"{"ok": true}"#));
    assert_eq!(outcome, ReportOutcome::Accepted);
    assert!(backend_ok);

    let record = record.borrow();
    let request = record.request();
    assert!(request.starts_with("POST /api/restroom/status HTTP/1.1\r\n"));
    assert!(request.contains("Host: 10.0.0.5:8000\r\n"));
    assert!(request.contains("Content-Type: application/json\r\n"));
    assert_eq!(record.endpoints[0].port, 8000);
}

#[test]
fn accepted_with_compact_ack() {
    let record = record();
    let (outcome, _) = run(&record, http_response(200, r#"{"ok":true,"device_id":"wc-floor2"}"#));
    assert!(outcome.is_ok());
}

#[test]
fn rejected_when_not_acknowledged() {
    let record = record();
    let (outcome, backend_ok) = run(&record, http_response(200, r#"{"ok": false}"#));
    assert_eq!(
        outcome,
        ReportOutcome::Failed(ReportError::BackendRejected { status: 200 })
    );
    assert!(!backend_ok);
}

#[test]
fn rejected_on_server_error_even_with_ack_body() {
    let record = record();
    let (outcome, _) = run(&record, http_response(500, r#"{"ok": true}"#));
    assert_eq!(outcome.error(), Some(ReportError::BackendRejected { status: 500 }));
}

#[test]
fn oversized_error_page_is_still_a_rejection() {
    let record = record();
    let page = "e".repeat(3000);
    let (outcome, backend_ok) = run(&record, http_response(500, &page));
    assert_eq!(outcome.error(), Some(ReportError::BackendRejected { status: 500 }));
    assert!(!backend_ok);
}

#[test]
fn refused_connection_is_a_transport_failure() {
    let record = record();
    let mut reporter = reporter(
        MockConnector::refusing(&record, Error::ConnectionRefused),
        loaded_state(),
    );
    let link = MockLink::up(&record);
    let mut wd = watchdog(&record);

    let outcome = reporter.report_status(&link, &mut wd);
    assert_eq!(
        outcome,
        ReportOutcome::Failed(ReportError::TransportFailure(Error::ConnectionRefused))
    );
    // Fed after the POST even though it failed.
    assert_eq!(
        record.borrow().events,
        [Event::Ensure, Event::Signal, Event::Connect, Event::Signal]
    );
}

#[test]
fn unreadable_response_is_a_transport_failure() {
    let record = record();
    let mut reporter = reporter(MockConnector::failing_reads(&record), loaded_state());
    let link = MockLink::up(&record);
    let mut wd = watchdog(&record);

    let outcome = reporter.report_status(&link, &mut wd);
    assert_eq!(
        outcome.error(),
        Some(ReportError::TransportFailure(Error::ReadError))
    );
    assert!(!reporter.backend_ok());
}

#[test]
fn secure_client_allocation_failure() {
    let record = record();
    let mut reporter = reporter(
        MockConnector::refusing(&record, Error::OutOfMemory),
        loaded_state(),
    );
    let link = MockLink::up(&record);
    let mut wd = watchdog(&record);

    assert_eq!(
        reporter.report_status(&link, &mut wd).error(),
        Some(ReportError::AllocationFailure)
    );
}

#[test]
fn link_down_never_touches_the_backend() {
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let mut state = DeviceState {
            cleaning_required: rng.r#gen(),
            last_clean_ts_ms: rng.r#gen(),
            counters_loaded: true,
            ..DeviceState::default()
        };
        for room in state.rooms.iter_mut() {
            *room = RoomState {
                occupied: rng.r#gen(),
                use_count: rng.r#gen(),
                total_use_ms: rng.r#gen(),
                door_closed: rng.r#gen(),
            };
        }

        let record = record();
        let mut reporter = reporter(
            MockConnector::responding(&record, http_response(200, r#"{"ok": true}"#)),
            state,
        );
        let link = MockLink::down(&record);
        let mut wd = watchdog(&record);

        let outcome = reporter.report_status(&link, &mut wd);
        assert_eq!(outcome, ReportOutcome::Failed(ReportError::LinkUnavailable));
        assert_eq!(link.ensures(), 1);
        assert_eq!(record.borrow().connects(), 0);
        assert!(record.borrow().requests.is_empty());
    }
}

#[test]
fn counters_not_loaded_sends_nothing() {
    let record = record();
    let state = DeviceState {
        counters_loaded: false,
        ..loaded_state()
    };
    let mut reporter = reporter(
        MockConnector::responding(&record, http_response(200, r#"{"ok": true}"#)),
        state,
    );
    let link = MockLink::up(&record);
    let mut wd = watchdog(&record);

    let outcome = reporter.report_status(&link, &mut wd);
    assert_eq!(outcome, ReportOutcome::Failed(ReportError::DataNotReady));
    assert_eq!(record.borrow().connects(), 0);
}

#[test]
fn ensure_then_post_order_and_watchdog_feeds() {
    let record = record();
    let mut reporter = reporter(
        MockConnector::responding(&record, http_response(200, r#"{"ok": true}"#)),
        loaded_state(),
    );
    let link = MockLink::reconnecting(&record);
    let mut wd = watchdog(&record);

    assert!(reporter.report_status(&link, &mut wd).is_ok());
    assert_eq!(
        record.borrow().events,
        [
            Event::Ensure,
            Event::Signal,
            Event::Connect,
            Event::Close,
            Event::Signal
        ]
    );
}

#[test]
fn payload_carries_every_field() {
    let record = record();
    run(&record, http_response(200, r#"{"ok": true}"#));
    let body = record.borrow().body();

    assert!(body.starts_with(r#"{"device_id":"wc-floor2","last_clean_ts_ms":1700000,"cleaning_required":false,"rooms":["#));
    assert!(body.contains(
        r#"{"room_id":1,"state":"occupied","use_count":4,"total_use_ms":240000,"door_closed":true}"#
    ));
    assert!(body.contains(r#"{"room_id":2,"state":"vacant""#));
    assert!(body.contains(
        r#"{"room_id":3,"state":"vacant","use_count":9,"total_use_ms":610500,"door_closed":false}"#
    ));
    assert!(body.ends_with(r#"],"ts_ms":2000000}"#));
    assert!(record.borrow().request().contains(&format!("Content-Length: {}\r\n", body.len())));
}

#[test]
fn cleaning_overrides_occupancy_on_the_wire() {
    let record = record();
    let mut state = loaded_state();
    state.cleaning_required = true;
    state.rooms[0].occupied = true;
    state.rooms[1].occupied = false;
    state.rooms[2].occupied = true;

    let mut reporter = reporter(
        MockConnector::responding(&record, http_response(200, r#"{"ok": true}"#)),
        state,
    );
    let link = MockLink::up(&record);
    let mut wd = watchdog(&record);
    assert!(reporter.report_status(&link, &mut wd).is_ok());

    let body = record.borrow().body();
    assert_eq!(body.matches(r#""state":"cleaning""#).count(), ROOM_COUNT);
    assert!(body.contains(r#""cleaning_required":true"#));
}

#[test]
fn backend_flag_tracks_the_latest_cycle() {
    let record = record();
    let mut reporter = reporter(
        MockConnector::responding(&record, http_response(200, r#"{"ok": true}"#)),
        loaded_state(),
    );
    let link = MockLink::up(&record);
    let mut wd = watchdog(&record);

    assert!(reporter.report_status(&link, &mut wd).is_ok());
    assert!(reporter.backend_ok());

    link.drop_link();
    assert!(!reporter.report_status(&link, &mut wd).is_ok());
    assert!(!reporter.backend_ok());
}
