use std::sync::Arc;

use uuid::Uuid;

use alumni_db::Database;
use alumni_db::models::OpportunityFields;
use alumni_types::models::Opportunity;

use crate::approval::{ApprovalStore, ApprovalWorkflow};
use crate::validate::OpportunityInput;

/// Posting approval. The approving admin is stamped into `approved_by`.
pub struct OpportunityApprovals {
    db: Arc<Database>,
}

impl ApprovalStore for OpportunityApprovals {
    type Record = Opportunity;

    fn list(&self, approved: bool) -> anyhow::Result<Vec<Opportunity>> {
        Ok(self
            .db
            .list_opportunities(approved)?
            .into_iter()
            .map(Opportunity::from)
            .collect())
    }

    fn find(&self, id: Uuid) -> anyhow::Result<Option<Opportunity>> {
        Ok(self.db.get_opportunity(&id.to_string())?.map(Opportunity::from))
    }

    fn is_approved(record: &Opportunity) -> bool {
        record.approved
    }

    fn approve(&self, id: Uuid, approver: Uuid) -> anyhow::Result<Option<Opportunity>> {
        Ok(self
            .db
            .approve_opportunity(&id.to_string(), &approver.to_string())?
            .map(Opportunity::from))
    }
}

pub struct OpportunityService {
    db: Arc<Database>,
    approvals: ApprovalWorkflow<OpportunityApprovals>,
}

impl OpportunityService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            approvals: ApprovalWorkflow::new(OpportunityApprovals { db: db.clone() }),
            db,
        }
    }

    pub fn approvals(&self) -> &ApprovalWorkflow<OpportunityApprovals> {
        &self.approvals
    }

    pub fn create(&self, input: &OpportunityInput) -> anyhow::Result<Opportunity> {
        let id = Uuid::new_v4().to_string();
        let row = self.db.create_opportunity(&id, &fields(input))?;
        Ok(Opportunity::from(row))
    }

    pub fn update(
        &self,
        id: Uuid,
        input: &OpportunityInput,
    ) -> anyhow::Result<Option<Opportunity>> {
        Ok(self
            .db
            .update_opportunity(&id.to_string(), &fields(input))?
            .map(Opportunity::from))
    }

    pub fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.db.delete_opportunity(&id.to_string())
    }
}

fn fields(input: &OpportunityInput) -> OpportunityFields<'_> {
    OpportunityFields {
        title: &input.title,
        posted_by: &input.posted_by,
        kind: input.kind.as_deref(),
        description: &input.description,
        needs_approval: input.needs_approval,
        is_paid: input.is_paid,
        amount: input.amount.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalError;

    fn input() -> OpportunityInput {
        OpportunityInput {
            title: "Test Opportunity".into(),
            posted_by: "Test Company".into(),
            kind: Some("full-time".into()),
            description: "Test description".into(),
            needs_approval: true,
            is_paid: true,
            amount: Some("$50,000".into()),
        }
    }

    #[test]
    fn approval_records_the_admin() {
        let service = OpportunityService::new(Arc::new(Database::open_in_memory().unwrap()));
        let opp = service.create(&input()).unwrap();
        assert!(!opp.approved);
        assert!(opp.approved_by.is_none());
        assert!(opp.needs_approval);

        let approvals = service.approvals();
        assert!(matches!(approvals.get_visible(opp.id), Err(ApprovalError::NotFound)));
        assert_eq!(approvals.list_pending().unwrap().len(), 1);

        let admin = Uuid::new_v4();
        let approved = approvals.approve(opp.id, admin).unwrap();
        assert!(approved.approved);
        assert_eq!(approved.approved_by, Some(admin));
        assert_eq!(approvals.get_visible(opp.id).unwrap().id, opp.id);
        assert!(approvals.list_pending().unwrap().is_empty());
    }

    #[test]
    fn only_approved_postings_are_listed() {
        let service = OpportunityService::new(Arc::new(Database::open_in_memory().unwrap()));
        let visible = service.create(&input()).unwrap();
        service.create(&input()).unwrap();
        service.approvals().approve(visible.id, Uuid::new_v4()).unwrap();

        let listed = service.approvals().list_approved().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, visible.id);
    }

    #[test]
    fn update_and_delete_report_missing_ids() {
        let service = OpportunityService::new(Arc::new(Database::open_in_memory().unwrap()));
        assert!(service.update(Uuid::new_v4(), &input()).unwrap().is_none());
        assert!(!service.delete(Uuid::new_v4()).unwrap());
    }
}
