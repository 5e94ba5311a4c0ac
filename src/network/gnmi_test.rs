use super::get_request;
use super::gnmi::first_json_ietf;
use super::gnmi::gnmi_path;
use super::json_ietf_value;
use super::set_delete_request;
use super::set_replace_request;
use super::set_update_request;
use crate::proto::gnmi::get_request::DataType;
use crate::proto::gnmi::typed_value::Value;
use crate::proto::gnmi::Encoding;
use crate::proto::gnmi::GetResponse;
use crate::proto::gnmi::Notification;
use crate::proto::gnmi::TypedValue;
use crate::proto::gnmi::Update;
use crate::Error;
use crate::NetworkError;

fn response_with(values: Vec<Value>) -> GetResponse {
    GetResponse {
        notification: vec![Notification {
            update: values
                .into_iter()
                .map(|v| Update {
                    val: Some(TypedValue { value: Some(v) }),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }],
    }
}

#[test]
fn test_gnmi_path_keeps_keys_per_element() {
    let path = gnmi_path("/greeter/list-node[name=ethernet-1/1]/leaf");

    assert_eq!(path.elem.len(), 3);
    assert_eq!(path.elem[0].name, "greeter");
    assert!(path.elem[0].key.is_empty());
    assert_eq!(path.elem[1].name, "list-node");
    assert_eq!(path.elem[1].key.get("name").map(String::as_str), Some("ethernet-1/1"));
    assert_eq!(path.elem[2].name, "leaf");
}

#[test]
fn test_first_json_ietf_takes_first_update() {
    let resp = response_with(vec![
        Value::JsonIetfVal(br#"{"name":"me"}"#.to_vec()),
        Value::JsonIetfVal(b"{}".to_vec()),
    ]);

    assert_eq!(first_json_ietf(resp).as_deref(), Some(r#"{"name":"me"}"#));
}

#[test]
fn test_first_json_ietf_without_updates_is_none() {
    assert_eq!(first_json_ietf(GetResponse::default()), None);
    assert_eq!(first_json_ietf(response_with(vec![])), None);
}

#[test]
fn test_first_json_ietf_ignores_other_encodings() {
    let resp = response_with(vec![Value::StringVal("plain".to_string())]);
    assert_eq!(first_json_ietf(resp), None);
}

#[test]
fn test_get_request_carries_filter_and_encoding() {
    let req = get_request("/greeter/list-node[name=a]", DataType::Config, Encoding::JsonIetf);

    assert_eq!(req.r#type(), DataType::Config);
    assert_eq!(req.encoding(), Encoding::JsonIetf);
    assert_eq!(req.path.len(), 1);
    assert_eq!(req.path[0].elem[1].key.get("name").map(String::as_str), Some("a"));
}

#[test]
fn test_set_update_and_replace_target_their_lists() {
    let update = set_update_request("/greeter/name", json_ietf_value(r#""me""#)).unwrap();
    assert_eq!(update.update.len(), 1);
    assert!(update.replace.is_empty() && update.delete.is_empty());
    assert_eq!(update.update[0].path.as_ref().unwrap().elem[1].name, "name");
    assert_eq!(
        update.update[0].val.as_ref().unwrap().value,
        Some(Value::JsonIetfVal(br#""me""#.to_vec()))
    );

    let replace = set_replace_request("/greeter", json_ietf_value("{}")).unwrap();
    assert_eq!(replace.replace.len(), 1);
    assert!(replace.update.is_empty() && replace.delete.is_empty());
}

#[test]
fn test_set_request_without_value_is_rejected() {
    let empty = TypedValue { value: None };

    let err = set_update_request("/greeter/name", empty.clone()).unwrap_err();
    assert!(matches!(err, Error::Network(NetworkError::EmptyGnmiValue)));
    let err = set_replace_request("/greeter/name", empty).unwrap_err();
    assert!(matches!(err, Error::Network(NetworkError::EmptyGnmiValue)));
}

#[test]
fn test_set_delete_request_lists_path() {
    let req = set_delete_request("/greeter/list-node[name=a]");

    assert_eq!(req.delete.len(), 1);
    assert_eq!(req.delete[0].elem[0].name, "greeter");
    assert!(req.update.is_empty() && req.replace.is_empty());
}
