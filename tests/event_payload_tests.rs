use tapahtuma::google::EventDraft;

fn standup_draft() -> EventDraft {
    EventDraft {
        title: "Standup".to_string(),
        description: "Daily".to_string(),
        location: "Zoom".to_string(),
        start: "2024-01-01T09:00".to_string(),
        end: "2024-01-01T09:15".to_string(),
    }
}

#[tokio::test]
async fn test_payload_maps_draft_fields() {
    let payload = standup_draft().prepare(chrono_tz::UTC).unwrap();

    assert_eq!(payload.summary, "Standup");
    assert_eq!(payload.description, "Daily");
    assert_eq!(payload.location, "Zoom");
    assert_eq!(payload.start.date_time, "2024-01-01T09:00:00+00:00");
    assert_eq!(payload.end.date_time, "2024-01-01T09:15:00+00:00");
    assert_eq!(payload.start.time_zone, "UTC");
    assert_eq!(payload.end.time_zone, "UTC");
}

#[tokio::test]
async fn test_payload_keeps_local_wall_time_in_other_zones() {
    let payload = standup_draft()
        .prepare(chrono_tz::Europe::Helsinki)
        .unwrap();

    // Helsinki is UTC+2 in January; the wall time the user chose stays put
    assert_eq!(payload.start.date_time, "2024-01-01T09:00:00+02:00");
    assert_eq!(payload.start.time_zone, "Europe/Helsinki");
}

#[tokio::test]
async fn test_payload_trims_text_fields() {
    let draft = EventDraft {
        title: "  Standup  ".to_string(),
        ..standup_draft()
    };

    let payload = draft.prepare(chrono_tz::UTC).unwrap();
    assert_eq!(payload.summary, "Standup");
}

/// The serialized body must use Google's field names
#[tokio::test]
async fn test_payload_wire_format() {
    let payload = standup_draft().prepare(chrono_tz::UTC).unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["summary"], "Standup");
    assert_eq!(json["description"], "Daily");
    assert_eq!(json["location"], "Zoom");
    assert_eq!(json["start"]["dateTime"], "2024-01-01T09:00:00+00:00");
    assert_eq!(json["start"]["timeZone"], "UTC");
    assert_eq!(json["end"]["dateTime"], "2024-01-01T09:15:00+00:00");
    assert_eq!(json["end"]["timeZone"], "UTC");
}
