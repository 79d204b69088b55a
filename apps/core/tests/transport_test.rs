use lookup_core::config::LookupConfig;
use lookup_core::contract::WidgetRequest;
use lookup_core::core_service::LookupService;
use lookup_core::index_store::RecordStore;
use lookup_core::transport::{handle_json, handle_request, ErrorCode, TransportResponse};

fn service_with_seed_record() -> LookupService<RecordStore> {
    let store = RecordStore::open_memory().unwrap();
    store
        .seed_from_json(r#"[{"object":"Account","id":"seed","fields":{"Name":"Acme"}}]"#)
        .unwrap();
    LookupService::new(LookupConfig::default(), store).unwrap()
}

#[test]
fn request_handler_returns_ok_transport_response() {
    let mut service = service_with_seed_record();

    let response = handle_request(&mut service, WidgetRequest::Focus);

    match response {
        TransportResponse::Ok { response } => {
            assert!(response.events.is_empty());
            let encoded = serde_json::to_string(&TransportResponse::Ok { response }).unwrap();
            assert!(encoded.contains("\"status\":\"ok\""));
        }
        _ => panic!("expected ok transport response"),
    }
}

#[test]
fn json_handler_rejects_invalid_json() {
    let mut service = service_with_seed_record();

    let response = handle_json(&mut service, "{not json");
    let decoded: TransportResponse = serde_json::from_str(&response).unwrap();

    match decoded {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::InvalidJson),
        _ => panic!("expected invalid json error"),
    }
}

#[test]
fn json_handler_rejects_unknown_kind() {
    let mut service = service_with_seed_record();

    let response = handle_json(&mut service, r#"{"kind":"launch","payload":{"id":"x"}}"#);

    assert!(response.contains("\"code\":\"invalid_json\""));
}

#[test]
fn create_without_form_maps_to_invalid_request() {
    let mut service = service_with_seed_record();

    let response = handle_json(
        &mut service,
        r#"{"kind":"create_record","payload":{"fields":{"Name":"Zeta"}}}"#,
    );
    let decoded: TransportResponse = serde_json::from_str(&response).unwrap();

    match decoded {
        TransportResponse::Err { error } => {
            assert_eq!(error.code, ErrorCode::InvalidRequest);
            assert!(error.message.contains("create form"));
        }
        _ => panic!("expected invalid request error"),
    }
}

#[test]
fn json_session_selects_record_by_click() {
    let mut service = service_with_seed_record();

    handle_json(&mut service, r#"{"kind":"focus"}"#);
    handle_json(&mut service, r#"{"kind":"input","payload":{"text":"acm"}}"#);
    handle_json(&mut service, r#"{"kind":"tick","payload":{"elapsed_ms":300}}"#);
    let response = handle_json(&mut service, r#"{"kind":"click_row","payload":{"id":"seed"}}"#);

    let decoded: TransportResponse = serde_json::from_str(&response).unwrap();
    match decoded {
        TransportResponse::Ok { response } => {
            assert_eq!(response.events.len(), 1);
            assert_eq!(response.view.selection.len(), 1);
            assert_eq!(response.view.selection[0].id, "seed");
            assert!(!response.view.dropdown_open);
        }
        _ => panic!("expected ok transport response"),
    }
}

#[test]
fn json_configure_switches_field_and_maps_invalid_config() {
    let mut service = service_with_seed_record();

    let response = handle_json(
        &mut service,
        r#"{"kind":"configure","payload":{"config":{"multi_select":true,"limit":3}}}"#,
    );
    assert!(response.contains("\"status\":\"ok\""));
    assert!(service.lookup().config().multi_select);
    assert_eq!(service.lookup().config().limit, 3);
    assert_eq!(service.lookup().config().object_api_name, "Account");

    let response = handle_json(
        &mut service,
        r#"{"kind":"configure","payload":{"config":{"limit":500}}}"#,
    );
    let decoded: TransportResponse = serde_json::from_str(&response).unwrap();
    match decoded {
        TransportResponse::Err { error } => assert_eq!(error.code, ErrorCode::Config),
        _ => panic!("expected config error"),
    }
    assert_eq!(service.lookup().config().limit, 3);
}
