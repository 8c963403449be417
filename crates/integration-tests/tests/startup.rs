mod harness;

use harness::config::ConfigBuilder;
use harness::mock_model::MockModel;
use harness::server::TestServer;
use murmur_config::InitPolicy;
use serde_json::json;

#[tokio::test]
async fn eager_policy_loads_before_first_job() {
    let mock = MockModel::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_init(InitPolicy::Eager).build();

    let server = TestServer::start(config).await.unwrap();
    assert_eq!(mock.load_count(), 1);

    let envelope = server.run_job(json!({"text": "Hello world", "output_format": "wav"})).await;
    assert_eq!(envelope["status"], "COMPLETED");
    assert_eq!(mock.load_count(), 1);
}

#[tokio::test]
async fn eager_load_failure_aborts_startup() {
    let mock = MockModel::start_failing_loads(1).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_init(InitPolicy::Eager).build();

    let err = TestServer::start(config).await.err().expect("startup should fail");

    assert!(err.to_string().contains("checkpoint not found"), "{err}");
}

#[tokio::test]
async fn lazy_policy_defers_load_to_first_job() {
    let mock = MockModel::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_init(InitPolicy::Lazy).build();

    let server = TestServer::start(config).await.unwrap();
    assert_eq!(mock.load_count(), 0);

    for _ in 0..3 {
        let envelope = server.run_job(json!({"text": "hi", "output_format": "wav"})).await;
        assert_eq!(envelope["status"], "COMPLETED");
    }

    assert_eq!(mock.load_count(), 1);
    assert_eq!(mock.generate_count(), 3);
}

#[tokio::test]
async fn concurrent_first_jobs_share_one_load() {
    let mock = MockModel::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_init(InitPolicy::Lazy).build();
    let server = TestServer::start(config).await.unwrap();

    let mut jobs = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let client = server.client().clone();
        let url = server.url("/runsync");
        jobs.spawn(async move {
            let resp = client
                .post(url)
                .json(&json!({"input": {"text": "hi", "output_format": "wav"}}))
                .send()
                .await
                .unwrap();
            resp.json::<serde_json::Value>().await.unwrap()
        });
    }

    while let Some(envelope) = jobs.join_next().await {
        assert_eq!(envelope.unwrap()["status"], "COMPLETED");
    }
    assert_eq!(mock.load_count(), 1);
    assert_eq!(mock.generate_count(), 8);
}

#[tokio::test]
async fn lazy_load_failure_is_retried() {
    let mock = MockModel::start_failing_loads(1).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_init(InitPolicy::Lazy).build();
    let server = TestServer::start(config).await.unwrap();

    let first = server.run_job(json!({"text": "hi", "output_format": "wav"})).await;
    assert_eq!(first["status"], "FAILED");
    assert!(first["output"]["error"].as_str().unwrap().contains("model load failed"));

    let second = server.run_job(json!({"text": "hi", "output_format": "wav"})).await;
    assert_eq!(second["status"], "COMPLETED");
    assert_eq!(mock.load_count(), 2);
}
