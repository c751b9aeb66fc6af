// Reminder message texts
//
// These strings are customer-facing collections notices; keep them
// byte-for-byte stable unless the wording is deliberately changed.

use crate::models::Phase;

/// Landing page linked from the pre-due and due reminders
pub const DEFAULT_SITE_URL: &str = "https://simpletk.co.kr/";

/// Renders the message body for each phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    site_url: String,
}

impl MessageTemplates {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    /// Interpolate `applicant_name` (and the site URL where the phase links to it)
    pub fn render(&self, phase: Phase, applicant_name: &str) -> String {
        match phase {
            Phase::PreDue => format!(
                "안녕하세요, {applicant_name}님. 내일은 약정하신 날입니다.\n\
                 원활한 진행을 위해 신청 내역을 미리 확인해 주세요.\n\
                 {}",
                self.site_url
            ),
            Phase::Due => format!(
                "안녕하세요, {applicant_name}님. 오늘은 약정하신 날입니다.\n\
                 아래 링크를 통해 약정하신 상품권을 첨부해 주시면 신속히 처리해 드리겠습니다. 감사합니다.\n\
                 {}",
                self.site_url
            ),
            Phase::OverdueDaily => format!(
                "안녕하세요, {applicant_name}님. 약정하신 상품권이 아직 첨부되지 않았습니다.\n\
                 지속적인 미이행 시, 이용 약관에 따라 더치트 등록 및 민·형사상 법적 절차가 진행될 수 있음을 엄중히 안내드립니다. 조속한 이행 부탁드립니다."
            ),
            Phase::OverdueWeekly => format!(
                "{applicant_name}님, 현재 귀하의 계약 불이행으로 인해 법적 조치 중입니다.\n\
                 형사 고소와 별개로, 본 계약 의무 불이행으로 발생하는 채권추심 및 민사 소송 비용(송달료, 인지대, 변호사 보수 등) 일체는 판매자인 귀하의 전액 부담으로 청구됩니다. 더 큰 불이익이 발생하기 전에 해결하시기 바랍니다."
            ),
        }
    }
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL)
    }
}
