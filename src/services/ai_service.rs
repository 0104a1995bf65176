use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use validator::Validate;

use crate::config::Config;
use crate::error::Result;
use crate::models::evaluation::EvaluationResult;
use crate::services::ai_backend::{GeminiBackend, GenerativeBackend, ImageRequest, TextRequest};
use crate::utils::formatting::strip_emphasis;

pub const NO_ANSWER_FEEDBACK: &str = "לא הוזנה תשובה.";
pub const EVALUATION_FAILED_FEEDBACK: &str =
    "אירעה שגיאה בעת בדיקת התשובה. אנא נסה שנית מאוחר יותר.";
pub const SUMMARY_EMPTY_MESSAGE: &str = "לא ניתן היה לייצר סיכום כרגע.";
pub const SUMMARY_FAILED_MESSAGE: &str = "שגיאה בטעינת הסיכום.";
pub const STUDY_PLAN_EMPTY_MESSAGE: &str = "לא ניתן היה לייצר תוכנית לימוד כרגע.";
pub const STUDY_PLAN_FAILED_MESSAGE: &str = "אירעה שגיאה בעת יצירת סיכום הלמידה.";
pub const ASK_EMPTY_MESSAGE: &str = "מצטער, לא הצלחתי לייצר תשובה כרגע.";
pub const ASK_FAILED_MESSAGE: &str = "אירעה שגיאה בעת שליחת השאלה. אנא נסו שנית.";

/// Heading of the closing section every study plan ends with.
pub const EXTRA_TIPS_HEADING: &str = "טיפים נוספים ללמידה";

const IMAGE_MIME_TYPE: &str = "image/jpeg";
const IMAGE_ASPECT_RATIO: &str = "4:3";

/// Gateway to the generative-AI provider.
///
/// Every operation is one request with no retry, bounded by `timeout`, and always returns a
/// renderable value: failures are logged and replaced by the operation's fallback.
#[derive(Clone)]
pub struct AIService {
    backend: Arc<dyn GenerativeBackend>,
    timeout: Duration,
}

impl AIService {
    pub fn new(backend: Arc<dyn GenerativeBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn gemini(config: &Config, client: Client) -> Self {
        Self::new(
            Arc::new(GeminiBackend::new(config, client)),
            config.ai_timeout(),
        )
    }

    pub async fn evaluate_answer(
        &self,
        question: &str,
        official_answer: &str,
        student_answer: &str,
    ) -> EvaluationResult {
        if student_answer.trim().is_empty() {
            return EvaluationResult::new(0, NO_ANSWER_FEEDBACK);
        }

        let prompt = evaluation_prompt(question, official_answer, student_answer);
        self.call_or_fallback(
            "evaluate_answer",
            self.request_evaluation(prompt),
            EvaluationResult::new(0, EVALUATION_FAILED_FEEDBACK),
        )
        .await
    }

    pub async fn get_topic_summary(&self, topic: &str) -> String {
        self.text_or_fallback(
            "get_topic_summary",
            topic_summary_prompt(topic),
            SUMMARY_EMPTY_MESSAGE,
            SUMMARY_FAILED_MESSAGE,
        )
        .await
    }

    pub async fn generate_study_plan(&self, weak_topics: &[String]) -> String {
        self.text_or_fallback(
            "generate_study_plan",
            study_plan_prompt(weak_topics),
            STUDY_PLAN_EMPTY_MESSAGE,
            STUDY_PLAN_FAILED_MESSAGE,
        )
        .await
    }

    /// `None` means the caller should show its own non-AI visual.
    pub async fn generate_concept_image(
        &self,
        topic: &str,
        related_concepts: &[String],
    ) -> Option<String> {
        let request = ImageRequest {
            prompt: image_prompt(topic, related_concepts),
            aspect_ratio: IMAGE_ASPECT_RATIO.to_string(),
            mime_type: IMAGE_MIME_TYPE.to_string(),
        };
        self.call_or_fallback("generate_concept_image", self.request_image(request), None)
            .await
    }

    pub async fn ask_freeform_question(&self, question: &str) -> String {
        self.text_or_fallback(
            "ask_freeform_question",
            ask_prompt(question),
            ASK_EMPTY_MESSAGE,
            ASK_FAILED_MESSAGE,
        )
        .await
    }

    async fn text_or_fallback(
        &self,
        operation: &'static str,
        prompt: String,
        empty_message: &str,
        failed_message: &str,
    ) -> String {
        let reply = self
            .call_or_fallback(
                operation,
                self.request_text(prompt),
                Some(failed_message.to_string()),
            )
            .await;
        reply.unwrap_or_else(|| {
            tracing::warn!(operation, "AI returned an empty reply");
            empty_message.to_string()
        })
    }

    async fn request_evaluation(&self, prompt: String) -> Result<EvaluationResult> {
        let raw = self.backend.generate_text(TextRequest::json(prompt)).await?;
        let evaluation: EvaluationResult = serde_json::from_str(raw.trim())?;
        evaluation.validate()?;
        Ok(evaluation)
    }

    /// `None` when the reply was blank.
    async fn request_text(&self, prompt: String) -> Result<Option<String>> {
        let text = self.backend.generate_text(TextRequest::plain(prompt)).await?;
        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    async fn request_image(&self, request: ImageRequest) -> Result<Option<String>> {
        let Some(encoded) = self.backend.generate_image(request).await? else {
            return Ok(None);
        };
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| anyhow::anyhow!("Image payload is not base64: {}", e))?;
        Ok(Some(format!("data:{};base64,{}", IMAGE_MIME_TYPE, encoded)))
    }

    async fn call_or_fallback<T, F>(&self, operation: &'static str, call: F, fallback: T) -> T
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::error!(operation, error = ?e, "AI call failed, using fallback");
                fallback
            }
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "AI call timed out, using fallback"
                );
                fallback
            }
        }
    }
}

pub fn evaluation_prompt(question: &str, official_answer: &str, student_answer: &str) -> String {
    format!(
        r#"You are grading an answer on the Israeli high-school biology matriculation exam (Bagrut).

Question:
{question}

Official rubric answer:
{official_answer}

Student answer:
{student_answer}

Instructions:
1. Score the student answer from 0 to 100 by how well it covers the key ideas of the rubric answer.
2. Write constructive feedback in Hebrew: what was right and what was missing.
3. Reply with a single JSON object and nothing else, exactly: {{"score": <integer>, "feedback": "<text>"}}"#
    )
}

pub fn topic_summary_prompt(topic: &str) -> String {
    format!(
        "כתוב סיכום קצר (עד 3 פסקאות) בעברית על הנושא הביולוגי: \"{}\".\n\
         הסיכום מיועד לתלמידי תיכון המתכוננים לבגרות. הדגש את מושגי היסוד.",
        strip_emphasis(topic)
    )
}

/// Two distinct prompt shapes: encouragement only when nothing was missed, per-topic
/// remediation otherwise. Both close with the extra-tips section.
pub fn study_plan_prompt(weak_topics: &[String]) -> String {
    if weak_topics.is_empty() {
        format!(
            "התלמיד סיים תרגול בביולוגיה לבגרות וענה נכון על כל השאלות.\n\
             1. כתוב לו משוב קצר ומעודד בעברית.\n\
             2. הוסף כותרת מודגשת: \"{EXTRA_TIPS_HEADING}\" ותחתיה 2-3 טיפים כלליים להצלחה בבגרות בביולוגיה \
             (למשל: שימת לב למילות מפתח בשאלה, ניתוח גרפים, שימוש בטרמינולוגיה מדויקת)."
        )
    } else {
        format!(
            "התלמיד סיים תרגול בביולוגיה לבגרות והתקשה בנושאים הבאים: {}.\n\
             1. כתוב בעברית סיכום קצר וממוקד עבור כל אחד מהנושאים הללו, עם מושגי המפתח והטעויות הנפוצות.\n\
             2. הצע אסטרטגיית למידה לשיפור בנושאים אלו.\n\
             3. הוסף בסוף כותרת נפרדת ומודגשת: \"{EXTRA_TIPS_HEADING}\" ותחתיה 2-3 טיפים כלליים להצלחה בבגרות \
             בביולוגיה, שאינם קשורים בהכרח לנושאים החלשים (למשל: ניהול זמן, קריאת גרפים, ההבדל בין \"תאר\" ל\"הסבר\").\n\
             4. עצב את התשובה עם כותרות לכל נושא.",
            weak_topics.join(", ")
        )
    }
}

pub fn image_prompt(topic: &str, related_concepts: &[String]) -> String {
    let concepts: Vec<String> = related_concepts.iter().map(|c| strip_emphasis(c)).collect();
    format!(
        "A high quality educational biology illustration of: {}.\n\
         Focus on: {}.\n\
         Style: scientific textbook diagram, clean white background, clear details, realistic colors, \
         {} aspect ratio. No text labels.",
        topic,
        concepts.join(", "),
        IMAGE_ASPECT_RATIO
    )
}

pub fn ask_prompt(question: &str) -> String {
    format!(
        "אתה מורה לביולוגיה בתיכון המכין תלמידים לבגרות.\n\
         תלמיד שואל: \"{}\".\n\
         ענה בעברית:\n\
         1. בצורה ברורה, סבלנית ומעודדת.\n\
         2. עם מושגים ביולוגיים מדויקים ומוסברים היטב.\n\
         3. אם השאלה קשורה לחומר הבגרות, ציין זאת וקשר אותה לחומר.\n\
         4. עד 200 מילים, אלא אם נדרש פירוט רב.",
        question.trim()
    )
}
