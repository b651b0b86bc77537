/// Fire-and-forget navigation targets reachable from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    CreateAgreement,
    AgreementDetails(String),
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::CreateAgreement => "/agreements/new".to_string(),
            Navigation::AgreementDetails(id) => format!("/agreements/{id}"),
        }
    }
}
