//! 请求 DTO 定义

use serde::Deserialize;
use validator::Validate;

use crate::models::{NewReview, ReviewPatch};

/// 评论最大长度（字符）
pub const MAX_COMMENT_CHARS: u64 = 2000;

/// 创建评价请求
///
/// `userId` 仅用于核对，作者始终取自 Token。
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
    #[validate(
        required(message = "评分不能为空"),
        range(min = 1, max = 5, message = "评分必须在 1 到 5 之间")
    )]
    pub rating: Option<i32>,
    #[validate(length(max = 2000, message = "评论不能超过 2000 个字符"))]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    /// 组装待写入的评价，`author_id` 来自资格判定
    pub fn into_new_review(self, author_id: i64, event_id: i64) -> NewReview {
        NewReview {
            event_id,
            user_id: author_id,
            rating: self.rating.unwrap_or_default(),
            comment: self.comment,
        }
    }
}

/// 更新评价请求
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "评分必须在 1 到 5 之间"))]
    pub rating: Option<i32>,
    #[validate(length(max = 2000, message = "评论不能超过 2000 个字符"))]
    pub comment: Option<String>,
}

impl From<UpdateReviewRequest> for ReviewPatch {
    fn from(req: UpdateReviewRequest) -> Self {
        Self {
            rating: req.rating,
            comment: req.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(rating: Option<i32>, comment: Option<String>) -> CreateReviewRequest {
        CreateReviewRequest {
            event_id: Some(7),
            user_id: None,
            rating,
            comment,
        }
    }

    #[test]
    fn test_rating_bounds() {
        for rating in 1..=5 {
            assert!(create_request(Some(rating), None).validate().is_ok());
        }
        for rating in [0, 6, -1, 100] {
            assert!(
                create_request(Some(rating), None).validate().is_err(),
                "rating={rating} 应被拒绝"
            );
        }
        assert!(create_request(None, None).validate().is_err());
    }

    #[test]
    fn test_comment_length_counts_chars() {
        let max = "好".repeat(MAX_COMMENT_CHARS as usize);
        assert!(create_request(Some(5), Some(max)).validate().is_ok());

        let too_long = "a".repeat(MAX_COMMENT_CHARS as usize + 1);
        assert!(create_request(Some(5), Some(too_long)).validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let req: CreateReviewRequest = serde_json::from_str(
            r#"{"eventId": 7, "userId": 42, "rating": 5, "comment": "great"}"#,
        )
        .unwrap();
        assert_eq!(req.event_id, Some(7));
        assert_eq!(req.user_id, Some(42));

        let new_review = req.into_new_review(42, 7);
        assert_eq!(new_review.rating, 5);
        assert_eq!(new_review.comment.as_deref(), Some("great"));
    }

    #[test]
    fn test_update_request_validation() {
        assert!(UpdateReviewRequest::default().validate().is_ok());
        let bad = UpdateReviewRequest {
            rating: Some(0),
            comment: None,
        };
        assert!(bad.validate().is_err());
    }
}
