use futures::future::BoxFuture;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tosifier::error::GENERATION_FAILURE_MESSAGE;
use tosifier::models::load_allocation_sheet;
use tosifier::services::GenerationRequest;
use tosifier::{
    logger, CognitiveLevel, Config, GenerationError, GenerationService, QuizError, QuizFlow,
    QuizSession, QuizState, SourceDocument, ValidationError,
};

/// 返回固定回复的生成服务，记录调用次数和最后一次请求
struct MockService {
    reply: String,
    calls: AtomicUsize,
    last_request: std::sync::Mutex<Option<GenerationRequest>>,
}

impl MockService {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_request: std::sync::Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerationService for MockService {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        Box::pin(async move { Ok(self.reply.clone()) })
    }
}

const THREE_ITEMS: &str = r#"[
    {"topic": "Cells", "question": "Which organelle produces ATP?", "specification": "Remembering",
     "answers": [
        {"answer": "Nucleus", "is_correct": false},
        {"answer": "Mitochondrion", "is_correct": true},
        {"answer": "Ribosome", "is_correct": false},
        {"answer": "Golgi body", "is_correct": false}]},
    {"topic": "Genetics", "question": "Predict the ratio of a monohybrid cross.", "specification": "Applying",
     "answers": [
        {"answer": "3:1", "is_correct": true},
        {"answer": "1:1", "is_correct": false},
        {"answer": "9:3:3:1", "is_correct": false},
        {"answer": "1:2:1", "is_correct": false}]},
    {"question": "Judge the strongest evidence for inheritance.", "specification": "Evaluating",
     "answers": [
        {"answer": "A", "is_correct": false},
        {"answer": "B", "is_correct": false},
        {"answer": "C", "is_correct": true},
        {"answer": "D", "is_correct": false}]}
]"#;

fn session_with(service: Arc<MockService>) -> QuizSession {
    QuizSession::new(QuizFlow::with_service(service, &Config::default()))
}

/// 10 + 30 学时，20 题，附带文档
fn prepared_session(service: Arc<MockService>) -> QuizSession {
    let mut session = session_with(service);
    session.set_topic(0, "Cells");
    session.set_hours(0, "10");
    session.add_row();
    session.set_topic(1, "Genetics");
    session.set_hours(1, "30");
    session.set_total_items("20");
    session.attach_document(SourceDocument::pdf_bytes(
        "biology.pdf",
        b"%PDF-1.7 fake".to_vec(),
    ));
    session
}

#[test]
fn test_concrete_allocation_scenario() {
    let session = prepared_session(MockService::new(THREE_ITEMS));

    let totals = session.totals();
    assert_eq!(totals.hours, 40);

    let rows = session.rows();
    assert_eq!(rows[0].percentage(), 25);
    assert_eq!(rows[0].total_items(), 5);
    assert_eq!(rows[0].level_count(CognitiveLevel::Remembering), 1);
    assert_eq!(rows[1].percentage(), 75);
    assert_eq!(rows[1].total_items(), 15);
}

#[test]
fn test_successful_generation_keeps_order_and_flags() {
    logger::init();

    let service = MockService::new(THREE_ITEMS);
    let mut session = prepared_session(service.clone());

    let count = tokio_test::block_on(session.submit()).unwrap().len();
    assert_eq!(count, 3);

    let items = session.quiz_state().items();
    assert_eq!(items[0].question, "Which organelle produces ATP?");
    assert_eq!(items[1].question, "Predict the ratio of a monohybrid cross.");
    assert_eq!(items[2].topic, None);

    let flags: Vec<Vec<bool>> = items
        .iter()
        .map(|i| i.answers.iter().map(|a| a.is_correct).collect())
        .collect();
    assert_eq!(
        flags,
        vec![
            vec![false, true, false, false],
            vec![true, false, false, false],
            vec![false, false, true, false],
        ]
    );
    assert_eq!(service.calls(), 1);

    // 请求中包含文档、分配说明和 schema
    let request = service.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.document.mime_type, "application/pdf");
    assert!(!request.document.data.is_empty());
    assert!(request.prompt.contains("Topic no. 1. Cells"));
    assert_eq!(
        request.response_schema["items"]["required"],
        serde_json::json!(["question", "answers", "specification"])
    );
}

#[test]
fn test_unparseable_response_leaves_quiz_empty() {
    let service = MockService::new("Here is your quiz: 1) ...");
    let mut session = prepared_session(service.clone());

    let err = tokio_test::block_on(session.submit()).unwrap_err();

    assert!(matches!(err, QuizError::Generation(_)));
    assert_eq!(err.user_message(), GENERATION_FAILURE_MESSAGE);
    assert!(session.quiz_state().items().is_empty());
    assert_eq!(
        session.quiz_state(),
        &QuizState::Failed(GENERATION_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(service.calls(), 1);
}

#[test]
fn test_empty_topics_never_calls_service() {
    let service = MockService::new(THREE_ITEMS);
    let mut session = prepared_session(service.clone());
    session.remove_row();
    session.remove_row();

    let err = tokio_test::block_on(session.submit()).unwrap_err();

    assert!(matches!(err, QuizError::Validation(ValidationError::NoTopics)));
    assert_eq!(err.to_string(), "no topics");
    assert_eq!(service.calls(), 0);
    assert_eq!(session.quiz_state(), &QuizState::Idle);
}

#[test]
fn test_zero_hours_never_calls_service() {
    let service = MockService::new(THREE_ITEMS);
    let mut session = prepared_session(service.clone());
    session.set_hours(0, "0");
    session.set_hours(1, "");

    let err = tokio_test::block_on(session.submit()).unwrap_err();

    assert!(matches!(
        err,
        QuizError::Validation(ValidationError::NonPositiveHours)
    ));
    assert_eq!(err.to_string(), "non-positive hours");
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_sheet_file_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("biology.pdf"), b"%PDF-1.7").unwrap();

    let sheet_path = dir.path().join("tos.toml");
    let mut file = std::fs::File::create(&sheet_path).unwrap();
    writeln!(
        file,
        r#"total_items = 20
document = "biology.pdf"

[[topics]]
topic = "Cells"
hours = 10

[[topics]]
topic = "Genetics"
hours = "30"
"#
    )
    .unwrap();

    let sheet = load_allocation_sheet(&sheet_path).await.unwrap();
    let service = MockService::new(THREE_ITEMS);
    let flow = QuizFlow::with_service(service.clone(), &Config::default());
    let mut session = QuizSession::with_rows(
        flow,
        sheet.rows(),
        sheet.total_items,
        Config::default().rounding_policy,
    );
    session.attach_document(SourceDocument::pdf(sheet.document.clone().unwrap()));

    assert_eq!(session.rows()[1].total_items(), 15);

    let items = session.submit().await.unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：GEMINI_API_KEY=... TOS_DOCUMENT=... cargo test -- --ignored
async fn test_generate_quiz_against_live_service() {
    logger::init();

    let config = Config::from_env();
    let document = config
        .document_path
        .clone()
        .expect("需要设置 TOS_DOCUMENT");

    let flow = QuizFlow::new(&config).expect("创建生成服务失败");
    let mut session = QuizSession::new(flow);
    session.set_topic(0, "Main ideas of the document");
    session.set_hours(0, "1");
    session.set_total_items("5");
    session.attach_document(SourceDocument::pdf(document));

    let items = session.submit().await.expect("生成失败");

    println!("生成了 {} 道题", items.len());
    assert!(!items.is_empty());
}
