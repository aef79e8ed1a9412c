//! HTTP tests for the speech engines

use base64::{engine::general_purpose, Engine as _};
use mockito::{Matcher, Server};
use papercast_spk::config::VoiceConfig;
use papercast_spk::engines::google_cloud::GoogleCloudTtsEngine;
use papercast_spk::engines::google_translate::GoogleTranslateTtsEngine;
use papercast_spk::engines::TtsEngine;
use papercast_spk::error::SpeechError;

#[tokio::test]
async fn test_translate_engine_single_chunk() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("client".into(), "tw-ob".into()),
            Matcher::UrlEncoded("tl".into(), "zh-TW".into()),
            Matcher::UrlEncoded("q".into(), "擴散模型".into()),
            Matcher::UrlEncoded("total".into(), "1".into()),
            Matcher::UrlEncoded("idx".into(), "0".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body("ID3clip")
        .create_async()
        .await;

    let engine = GoogleTranslateTtsEngine::with_endpoint(server.url(), 5, 1.0).unwrap();
    let audio = engine.synthesize("擴散模型", &VoiceConfig::default()).await.unwrap();

    assert_eq!(&audio[..], b"ID3clip");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_translate_engine_concatenates_chunks() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::UrlEncoded("total".into(), "2".into()))
        .with_status(200)
        .with_body("ab")
        .expect(2)
        .create_async()
        .await;

    let text = format!("{}。{}", "標".repeat(90), "題".repeat(90));
    let engine = GoogleTranslateTtsEngine::with_endpoint(server.url(), 5, 1.0).unwrap();
    let audio = engine.synthesize(&text, &VoiceConfig::default()).await.unwrap();

    assert_eq!(&audio[..], b"abab");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_translate_engine_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let engine = GoogleTranslateTtsEngine::with_endpoint(server.url(), 5, 1.0).unwrap();
    let result = engine.synthesize("標題", &VoiceConfig::default()).await;
    assert!(matches!(result, Err(SpeechError::Api(_))));
}

#[tokio::test]
async fn test_google_cloud_engine_decodes_audio() {
    let mut server = Server::new_async().await;
    let encoded = general_purpose::STANDARD.encode(b"mp3-bytes");
    let mock = server
        .mock("POST", "/v1/text:synthesize")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "input": { "text": "標題" },
            "voice": { "languageCode": "zh-TW" },
            "audioConfig": { "audioEncoding": "MP3" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "audioContent": encoded }).to_string())
        .create_async()
        .await;

    let engine = GoogleCloudTtsEngine::new(server.url(), Some("test-key".to_string()), 5).unwrap();
    assert!(engine.is_available());
    let audio = engine.synthesize("標題", &VoiceConfig::default()).await.unwrap();

    assert_eq!(&audio[..], b"mp3-bytes");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_cloud_engine_missing_audio_content() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/text:synthesize")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let engine = GoogleCloudTtsEngine::new(server.url(), Some("test-key".to_string()), 5).unwrap();
    let result = engine.synthesize("標題", &VoiceConfig::default()).await;
    assert!(matches!(result, Err(SpeechError::Api(_))));
}
