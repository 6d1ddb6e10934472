/*!
 * Correction pipeline behavior against stub providers
 */

use std::sync::Arc;
use notemend::correction::{correct, CorrectionDispatcher, CorrectionPipeline, ModelConfig};
use notemend::errors::{CorrectionError, ProviderError};
use notemend::providers::mock::MockProvider;
use notemend::providers::{CompletionRequest, Provider};
use crate::common;

const SYSTEM: &str = "你是一名精通中文的语言专家";

fn pipeline(provider: &MockProvider, max_length: usize) -> CorrectionPipeline {
    let dispatcher = CorrectionDispatcher::new(Arc::new(provider.clone()), SYSTEM, ModelConfig::new("ep-test"));
    CorrectionPipeline::new(dispatcher, max_length)
}

#[tokio::test]
async fn test_identityCorrection_withShortDocuments_shouldRoundTrip() {
    common::init_logger();
    let documents = [
        "一句话。",
        "  带空白的文本\n\n第二段。  ",
        "![图片](images/1.png)\n说明文字。",
        "含有<b>标签</b>的文本",
    ];

    for document in documents {
        let provider = MockProvider::echo();
        let text = pipeline(&provider, 50).correct(document).await.unwrap();
        assert_eq!(text, document);
        assert_eq!(provider.request_count(), 1);
    }
}

#[tokio::test]
async fn test_unwrappedReplies_shouldAlsoRoundTrip() {
    let provider = MockProvider::echo_unwrapped();
    let text = pipeline(&provider, 50).correct("没有标签的回复。").await.unwrap();
    assert_eq!(text, "没有标签的回复。");
}

#[tokio::test]
async fn test_exactLengthDocument_shouldBeSentAsOneRequest() {
    let provider = MockProvider::echo();
    let document = "一二三四五六七八九十";
    let text = pipeline(&provider, 10).correct(document).await.unwrap();

    assert_eq!(text, document);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_indexedStub_shouldPreserveSegmentOrder() {
    let provider = MockProvider::indexed();
    let document = "A。B。C。D。E。".repeat(3);

    let text = pipeline(&provider, 10).correct(&document).await.unwrap();

    let expected = "[1]A。B。C。D。E。\n[2]A。B。C。D。E。\n[3]A。B。C。D。E。";
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_everyRequest_shouldCarrySameSystemInstructionAndWrappedSegment() {
    let provider = MockProvider::echo();
    let document = common::sample_note(10);

    pipeline(&provider, 30).correct(&document).await.unwrap();

    let requests: Vec<CompletionRequest> = provider.requests();
    assert!(requests.len() > 1);
    for request in &requests {
        assert_eq!(request.system, SYSTEM);
        assert_eq!(request.model, "ep-test");
        assert!(request.user.starts_with("待优化文本包含在xml标签中：<note>"));
        assert!(request.user.ends_with("</note>"));
    }
}

#[tokio::test]
async fn test_failureOnSecondOfThree_shouldReturnErrorWithoutPartialText() {
    let provider = MockProvider::fail_on(2);
    let document = "A。B。C。D。E。".repeat(3);

    let result = pipeline(&provider, 10).correct(&document).await;

    match result {
        Err(CorrectionError::Transport { segment, source }) => {
            assert_eq!(segment, 2);
            assert!(matches!(source, ProviderError::ApiError { status_code: 503, .. }));
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
    // Nothing after the failing segment is sent
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_emptyReply_shouldBeMalformedResponse() {
    let provider = MockProvider::empty();
    let error = pipeline(&provider, 10).correct("内容。").await.unwrap_err();
    assert!(matches!(error, CorrectionError::MalformedResponse { segment: 1, .. }));
}

#[tokio::test]
async fn test_customResponse_shouldReplaceSegmentText() {
    let provider = MockProvider::echo().with_custom_response(|_| "<note>改好了。</note>".to_string());
    let text = pipeline(&provider, 4).correct("甲乙。丙丁。").await.unwrap();
    assert_eq!(text, "改好了。\n改好了。");
}

#[test]
fn test_correct_freeFunction_shouldWorkUnderBlockOn() {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::echo());
    let text = tokio_test::block_on(correct("第一句。第二句。", SYSTEM, provider, ModelConfig::default(), 4)).unwrap();
    assert_eq!(text, "第一句。\n第二句。");
}
