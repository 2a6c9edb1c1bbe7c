/*!
 * HTTP contract tests for the record source and the geocoder
 *
 * Both clients run against a local mock server; no real service is contacted.
 */

use prestadores::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query() -> LocationQuery {
    LocationQuery::new(76, 76109).unwrap()
}

fn client_for(server: &MockServer) -> GeoDataClient {
    GeoDataClient::with_endpoint(&format!("{}/rest/v1/rpc/filtrar_prestadores", server.uri()), "anon-key")
        .unwrap()
}

fn map_for(server: &MockServer) -> GoogleMap {
    let config = ConfigBuilder::new()
        .geocode_url(format!("{}/geocode", server.uri()))
        .maps_api_key("maps-key")
        .build();
    GoogleMap::new(&config).unwrap()
}

#[tokio::test]
async fn fetch_posts_location_with_key_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/filtrar_prestadores"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(body_json(json!({"id_departamento": 76, "id_municipio": 76109})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "departamento_nombre": "Valle del Cauca",
                "municipio_nombre": "Buenaventura",
                "region": "Pacífico",
                "subregion": "Litoral",
                "latitud": "3.8801",
                "longitud": -77.0312,
                "prestador_nombre": "Clínica A",
                "es_prestador_primario": true,
                "categoria_especialidad": "Especialidades",
                "nombre_especialidad": "Cardiología",
                "complejidad": "Alta",
                "id_prestador_medicamentos": 12,
                "nombre_prestador_medicamentos": "Droguería Central",
                "contrato_activo_medicamentos": true
            },
            {
                "prestador_nombre": "Clínica B",
                "categoria_especialidad": "Especialidades",
                "nombre_especialidad": "Pediatría",
                "latitud": null,
                "longitud": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server).fetch(query()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].coordinates(), Coordinates::new(3.8801, -77.0312));
    assert_eq!(records[0].display_name(), "Clínica A (Alta)");
    assert_eq!(records[0].secondary(ProviderClass::Medications).id, Some(12));
    assert!(!records[1].coordinates().is_valid());
}

#[tokio::test]
async fn null_columns_do_not_fail_the_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/filtrar_prestadores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "latitud": 3.8801,
                "longitud": -77.0312,
                "prestador_nombre": "Clínica A",
                "es_prestador_primario": null,
                "categoria_especialidad": null,
                "nombre_especialidad": "Cardiología",
                "id_prestador_complementario": null,
                "nombre_prestador_complementario": null,
                "contrato_activo_complementario": null,
                "contrato_activo_medicamentos": null
            },
            {
                "prestador_nombre": "Clínica B",
                "categoria_especialidad": "Especialidades",
                "nombre_especialidad": "Pediatría",
                "id_prestador_complementario": 5,
                "nombre_prestador_complementario": "Laboratorio Sur",
                "contrato_activo_complementario": true
            }
        ])))
        .mount(&server)
        .await;

    let records = client_for(&server).fetch(query()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].category, "");
    assert!(!records[0].is_primary);
    assert!(!records[0].secondary(ProviderClass::Complementary).active_contract);

    let store = prestadores::dataset::RecordStore::from_records(records);
    let active = store.active_for_class(ProviderClass::Complementary);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].provider_name, "Clínica B");
}

#[tokio::test]
async fn server_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(query()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_remote());
    assert_eq!(err.user_message(), prestadores::error::FETCH_FAILED_MESSAGE);
}

#[tokio::test]
async fn undecodable_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"not a list\"}"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(query()).await.unwrap_err();
    assert!(matches!(err, PrestadoresError::Deserialize { .. }));
}

#[tokio::test]
async fn missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = ConfigBuilder::new().endpoint_url(server.uri()).build();
    let client = GeoDataClient::new(&config).unwrap();
    let err = client.fetch(query()).await.unwrap_err();
    assert!(matches!(err, PrestadoresError::Configuration { .. }));
}

#[tokio::test]
async fn geocode_returns_first_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .and(query_param("address", "Muelle turístico, Buenaventura"))
        .and(query_param("key", "maps-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 3.8905, "lng": -77.0795}}},
                {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
            ]
        })))
        .mount(&server)
        .await;

    let center = map_for(&server)
        .geocode("Muelle turístico, Buenaventura")
        .await
        .unwrap();
    assert_eq!(center, Coordinates::new(3.8905, -77.0795));
}

#[tokio::test]
async fn geocode_zero_results_is_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let err = map_for(&server).geocode("nowhere").await.unwrap_err();
    match &err {
        PrestadoresError::GeocodingMiss { query, status } => {
            assert_eq!(query, "nowhere");
            assert_eq!(status, "ZERO_RESULTS");
        }
        other => panic!("expected a geocoding miss, got {:?}", other),
    }
    assert_eq!(err.user_message(), prestadores::error::GEOCODING_MISS_MESSAGE);
}

#[tokio::test]
async fn lookup_end_to_end_against_mock_services() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "latitud": 3.8801,
                "longitud": -77.0312,
                "prestador_nombre": "Clínica A",
                "categoria_especialidad": "Especialidades",
                "nombre_especialidad": "Cardiología"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 3.8905, "lng": -77.0795}}}]
        })))
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .endpoint_url(format!("{}/rpc", server.uri()))
        .api_key("anon-key")
        .maps_api_key("maps-key")
        .geocode_url(format!("{}/geocode", server.uri()))
        .build();
    let mut lookup = ProviderLookup::new(
        GeoDataClient::new(&config).unwrap(),
        GoogleMap::new(&config).unwrap(),
        &config,
    );

    lookup.select_department(Some(76));
    lookup.select_municipality(Some(76109));
    assert_eq!(lookup.submit().await.unwrap(), 1);
    assert_eq!(lookup.map().focus().zoom, config.results_zoom);

    lookup.search_place("Muelle turístico").await.unwrap();
    assert_eq!(lookup.map().focus().center, Coordinates::new(3.8905, -77.0795));
    assert_eq!(lookup.map().focus().zoom, config.place_zoom);
}
