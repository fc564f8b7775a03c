mod support;

use std::sync::Arc;

use chem_core::{InMemoryAuditSink, OrchestratorConfig, ReportStore, ResolutionOrchestrator, Stage};
use chem_domain::{RequestMeta, ResponseSource, SubstanceKey};

use support::*;

#[tokio::test]
async fn every_input_yields_a_defined_report() {
    let h = harness(OrchestratorConfig::default());
    for name in ["", "   ", "Ácido acetilsalicílico", "氯霉素", "Xyzabc123", "Paracetamol"] {
        let res = h.orchestrator.resolve(name, &RequestMeta::default()).await;
        assert!(res.report.validate().is_ok(), "report for {name:?} must be valid");
        assert!(!res.report.products().is_empty(), "fallback payload for {name:?} is non-empty");
        assert!(!res.report.references().is_empty());
    }
}

#[tokio::test]
async fn second_call_is_served_from_cache_with_same_content() {
    let h = harness(OrchestratorConfig::default());
    let meta = RequestMeta::new(Some("10.1.1.1"), Some("curl/8"));

    let first = h.orchestrator.resolve("Paracetamol", &meta).await;
    assert!(matches!(first.source, ResponseSource::Gemini | ResponseSource::Mock | ResponseSource::MockFallback));
    assert!(!first.was_cached);

    let second = h.orchestrator.resolve("Paracetamol", &meta).await;
    assert_eq!(second.source, ResponseSource::Cache);
    assert!(second.was_cached);
    assert_eq!(first.report, second.report);
    assert_eq!(h.synthesizer.calls(), 1);

    let audited: Vec<ResponseSource> = h.audit.resolutions().await.iter().map(|r| r.response_source).collect();
    assert_eq!(audited, vec![first.source, ResponseSource::Cache]);
}

#[tokio::test]
async fn store_hit_skips_synthesizer_and_warms_cache() {
    let h = harness(OrchestratorConfig::default());
    let saved = report("4-isobutilfenol", "Davies (1998)");
    h.store.save(&SubstanceKey::new("Ibuprofeno"), "Ibuprofeno", &saved, ResponseSource::Gemini, 12).await.unwrap();

    let res = h.orchestrator.resolve("ibuprofeno", &RequestMeta::default()).await;
    assert_eq!(res.source, ResponseSource::Database);
    assert_eq!(res.report, saved);
    assert_eq!(h.synthesizer.calls(), 0);
    assert_eq!(res.path, vec![Stage::Start, Stage::CacheCheck, Stage::StoreCheck, Stage::Audit, Stage::Done]);

    let cached = h.cache.entry(&SubstanceKey::new("IBUPROFENO")).expect("write-through to cache");
    assert_eq!(cached.source, ResponseSource::Database);
    assert_eq!(cached.report, saved);
}

#[tokio::test]
async fn store_is_consulted_when_cache_is_disabled() {
    let h = harness(OrchestratorConfig { enable_cache: false, ..OrchestratorConfig::default() });
    let saved = report("4-isobutilfenol", "Davies (1998)");
    h.store.save(&SubstanceKey::new("Ibuprofeno"), "Ibuprofeno", &saved, ResponseSource::Gemini, 12).await.unwrap();

    let res = h.orchestrator.resolve("Ibuprofeno", &RequestMeta::default()).await;
    assert_eq!(res.source, ResponseSource::Database);
    assert_eq!(res.report, saved);
    assert_eq!(h.synthesizer.calls(), 0);
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn static_dataset_ignores_case_without_credential() {
    let h = harness(OrchestratorConfig::minimal());
    let upper = h.orchestrator.resolve("Paracetamol", &RequestMeta::default()).await;

    let fresh = harness(OrchestratorConfig::minimal());
    let lower = fresh.orchestrator.resolve("paracetamol", &RequestMeta::default()).await;

    assert_eq!(upper.source, ResponseSource::Mock);
    assert_eq!(lower.source, ResponseSource::Mock);
    assert_eq!(upper.report, lower.report);
    assert_eq!(upper.report, static_for("paracetamol"));
    assert!(!upper.report.products().is_empty());
    assert!(!upper.report.references().is_empty());
}

#[tokio::test]
async fn unknown_substance_gets_one_generic_product() {
    let h = harness(OrchestratorConfig::default());
    let res = h.orchestrator.resolve("Xyzabc123", &RequestMeta::default()).await;
    assert_eq!(res.source, ResponseSource::Mock);
    assert_eq!(res.report.products().len(), 1);
    assert!(res.report.products()[0].substance().contains("Xyzabc123"));
    assert!(res.report.references().iter().any(|r| r.contains("PubMed")));
}

#[tokio::test]
async fn synthesized_report_is_persisted_with_metadata() {
    let synth = CountingSynthesizer::wrap(Arc::new(FixedSynthesizer(report("NAPQI", "Larson (2005)"))));
    let h = harness_with(synth, OrchestratorConfig::default());

    let res = h.orchestrator.resolve("  Paracetamol ", &RequestMeta::default()).await;
    assert_eq!(res.source, ResponseSource::Gemini);
    assert_eq!(res.substance_key.as_str(), "paracetamol");

    let stored = h.store.entry(&SubstanceKey::new("paracetamol")).await.expect("persisted");
    assert_eq!(stored.response_source, ResponseSource::Gemini);
    assert_eq!(stored.search_term, "  Paracetamol ");
    assert_eq!(stored.cas_number, None);
    assert_eq!(stored.content_hash, res.report.content_hash());
    assert_eq!(h.cache.entry(&SubstanceKey::new("paracetamol")).map(|e| e.source), Some(ResponseSource::Gemini));
}

#[tokio::test]
async fn audit_record_carries_request_metadata() {
    let h = harness(OrchestratorConfig::default());
    let meta = RequestMeta::from_headers([("X-Forwarded-For", "203.0.113.7, 10.0.0.1"), ("User-Agent", "Mozilla/5.0")]);
    h.orchestrator.resolve("Dipirona", &meta).await;

    let records = h.audit.resolutions().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_client_ip, "203.0.113.7");
    assert_eq!(records[0].user_agent, "Mozilla/5.0");
    assert_eq!(records[0].substance_name, "dipirona");
    assert_eq!(records[0].search_term, "Dipirona");
}

#[tokio::test]
async fn detailed_events_follow_each_path() {
    let h = harness(OrchestratorConfig::default());
    h.orchestrator.resolve("Paracetamol", &RequestMeta::default()).await;
    h.orchestrator.resolve("Paracetamol", &RequestMeta::default()).await;

    let actions: Vec<String> = h.audit
                                .system_events()
                                .await
                                .into_iter()
                                .map(|e| format!("{}/{}", e.component, e.action))
                                .collect();
    assert_eq!(actions,
               vec!["search/start", "mock/generate", "search/complete", "search/start", "search/cache_hit", "search/complete"]);
}

#[tokio::test]
async fn orchestrator_without_cache_backend_still_resolves() {
    let store = chem_core::InMemoryReportStore::new();
    let audit = InMemoryAuditSink::new();
    let orchestrator = ResolutionOrchestrator::builder(Arc::new(store.clone()),
                                                       Arc::new(chem_core::ModelSynthesizer::offline()),
                                                       Arc::new(audit.clone())).build();
    orchestrator.resolve("Ibuprofeno", &RequestMeta::default()).await;
    let second = orchestrator.resolve("Ibuprofeno", &RequestMeta::default()).await;
    assert_eq!(second.source, ResponseSource::Database);
    assert!(!second.path.contains(&Stage::CacheCheck));
}
