//! # Degraded-Input Behavior
//!
//! The engine never refuses a batch. These tests feed it progressively worse
//! input, down to nothing at all, and check that each run still produces a
//! report where exactly the checks with inputs ran.

#[cfg(test)]
mod tests {
    use ch_analysis::ConsensusHealthApi;
    use shared_types::{
        DocumentBatch, FetchOutcome, NetworkDocument, Scope, WarningKind,
    };

    use crate::fixtures::{
        agreeing_vote, agreeing_vote_with_expiry, consensus, init_test_logging, roster_config,
        service, service_with, statistics, AUTHORITIES, MILLIS_PER_DAY, NOW,
    };

    #[test]
    fn empty_batch_reports_what_is_missing_and_nothing_else() {
        init_test_logging();
        let report = service().analyze(DocumentBatch::new());

        let kinds: Vec<WarningKind> = report.findings().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::NoConsensusKnown, WarningKind::VotesMissing]
        );
        assert_eq!(report.findings()[1].scope, Scope::network());

        assert!(report.consensus().is_none());
        assert!(report.votes().is_empty());
        assert!(report.flag_overlap().is_empty());
        assert!(report.relay_flags().is_empty());
        assert!(report.authority_versions().is_empty());
        assert!(report.download_statistics().is_empty());
    }

    #[test]
    fn fetch_outcomes_are_reported_even_without_documents() {
        init_test_logging();
        let mut batch = DocumentBatch::new();
        batch.record_fetch("moria1", FetchOutcome::TimedOut);
        batch.record_fetch("tor26", FetchOutcome::Failed);

        let report = service().analyze(batch);

        let kinds: Vec<WarningKind> = report.findings().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::NoConsensusKnown,
                WarningKind::ConsensusDownloadTimeout,
                WarningKind::VotesMissing,
            ]
        );
        // A failed fetch is not a timeout.
        let timeout = report
            .findings_of_kind(WarningKind::ConsensusDownloadTimeout)
            .next()
            .expect("timeout finding present");
        assert_eq!(timeout.scope, Scope::authority("moria1"));
    }

    #[test]
    fn consensus_without_votes_skips_vote_dependent_checks() {
        init_test_logging();
        let mut batch = DocumentBatch::new();
        batch.push_document(NetworkDocument::Consensus(consensus()));

        let report = service().analyze(batch);

        let kinds: Vec<WarningKind> = report.findings().iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![WarningKind::VotesMissing]);
        assert!(!report.has_finding(WarningKind::NoConsensusKnown));
        assert!(!report.has_finding(WarningKind::BandwidthScannerResultsMissing));

        assert!(report.consensus().is_some());
        assert!(report.votes().is_empty());
        assert!(report.flag_overlap().is_empty());
        assert_eq!(report.relay_flags().len(), 5);
        for row in report.relay_flags() {
            assert!(row.vote_cells.is_empty());
            assert!(row.consensus_flags.is_some());
        }
        assert_eq!(report.authority_versions().len(), 3);
    }

    #[test]
    fn later_vote_from_the_same_authority_replaces_the_earlier_one() {
        init_test_logging();
        let healthy = agreeing_vote("tor26");
        let expiring = agreeing_vote_with_expiry("tor26", NOW + 5 * MILLIS_PER_DAY);

        let mut expiring_last = DocumentBatch::new();
        expiring_last.push_document(NetworkDocument::Consensus(consensus()));
        expiring_last.push_document(NetworkDocument::Vote(agreeing_vote("gabelmoo")));
        expiring_last.push_document(NetworkDocument::Vote(agreeing_vote("moria1")));
        expiring_last.push_document(NetworkDocument::Vote(healthy.clone()));
        expiring_last.push_document(NetworkDocument::Vote(expiring.clone()));

        let report = service().analyze(expiring_last);
        let kinds: Vec<WarningKind> = report.findings().iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![WarningKind::CertificateExpiresInTwoWeeks]);
        assert_eq!(
            report.findings()[0].scope,
            Scope::authority("tor26")
        );

        let mut healthy_last = DocumentBatch::new();
        healthy_last.push_document(NetworkDocument::Consensus(consensus()));
        healthy_last.push_document(NetworkDocument::Vote(agreeing_vote("gabelmoo")));
        healthy_last.push_document(NetworkDocument::Vote(agreeing_vote("moria1")));
        healthy_last.push_document(NetworkDocument::Vote(expiring));
        healthy_last.push_document(NetworkDocument::Vote(healthy));

        let report = service().analyze(healthy_last);
        assert!(report.findings().is_empty(), "{:?}", report.findings());
    }

    #[test]
    fn roster_turns_the_network_wide_gap_into_per_authority_findings() {
        init_test_logging();
        let mut batch = DocumentBatch::new();
        batch.push_document(NetworkDocument::Consensus(consensus()));

        let report = service_with(roster_config(), statistics()).analyze(batch);

        let scopes: Vec<(WarningKind, Option<&str>)> = report
            .findings()
            .iter()
            .map(|f| (f.kind, f.scope.authority.as_deref()))
            .collect();
        assert_eq!(
            scopes,
            vec![
                (WarningKind::VotesMissing, Some(AUTHORITIES[0].0)),
                (WarningKind::VotesMissing, Some(AUTHORITIES[1].0)),
                (WarningKind::VotesMissing, Some(AUTHORITIES[2].0)),
            ]
        );
    }
}
