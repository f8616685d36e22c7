use crate::wimax::{
    FragmentStage, MacHeaderType, MacQueue, MacSdu, UplinkQueue, FRAGMENT_SUBHEADER_BYTES,
    GENERIC_HEADER_BYTES,
};

fn generic(id: u64, payload: u32) -> MacSdu {
    MacSdu::new(id, payload, MacHeaderType::Generic)
}

fn bw_req(id: u64, payload: u32) -> MacSdu {
    MacSdu::new(id, payload, MacHeaderType::BandwidthRequest)
}

#[test]
fn fresh_packet_reports_header_and_required_bytes() {
    let mut q = MacQueue::new(16);
    q.enqueue(generic(1, 1494)).expect("enqueue");

    assert!(q.has_packets(None));
    assert!(q.has_packets(Some(MacHeaderType::Generic)));
    assert!(!q.has_packets(Some(MacHeaderType::BandwidthRequest)));

    assert_eq!(q.first_header_bytes(MacHeaderType::Generic), 6);
    assert_eq!(q.first_required_bytes(MacHeaderType::Generic), 1500);
    assert!(!q.is_fragmentation_in_progress(MacHeaderType::Generic));
}

#[test]
fn empty_queue_reports_zeroes() {
    let q = MacQueue::new(16);
    assert!(!q.has_packets(None));
    assert_eq!(q.first_required_bytes(MacHeaderType::Generic), 0);
    assert_eq!(q.first_header_bytes(MacHeaderType::Generic), 0);
    assert!(!q.is_fragmentation_in_progress(MacHeaderType::Generic));
}

#[test]
fn whole_dequeue_pops_in_fifo_order_per_header_type() {
    let mut q = MacQueue::new(16);
    q.enqueue(generic(1, 100)).expect("enqueue");
    q.enqueue(bw_req(2, 0)).expect("enqueue");
    q.enqueue(generic(3, 200)).expect("enqueue");

    // The bandwidth-request view skips over the generic head.
    let pdu = q.dequeue(MacHeaderType::BandwidthRequest).expect("bw-req");
    assert_eq!(pdu.sdu_id, 2);
    assert_eq!(pdu.size_bytes, 6);
    assert_eq!(pdu.fragment, FragmentStage::Whole);

    let pdu = q.dequeue(MacHeaderType::Generic).expect("generic");
    assert_eq!(pdu.sdu_id, 1);
    assert_eq!(pdu.size_bytes, 106);

    let pdu = q.dequeue(MacHeaderType::Generic).expect("generic");
    assert_eq!(pdu.sdu_id, 3);
    assert!(q.is_empty());
    assert!(q.dequeue(MacHeaderType::Generic).is_none());
}

#[test]
fn fragment_chain_tracks_state_and_honors_cap() {
    let mut q = MacQueue::new(16);
    q.enqueue(generic(1, 1494)).expect("enqueue");

    // First fragment: fresh chain, cap 300 bytes total.
    let first = q
        .dequeue_fragment(MacHeaderType::Generic, 300)
        .expect("first fragment");
    assert_eq!(first.fragment, FragmentStage::First);
    assert_eq!(first.size_bytes, 300);
    assert!(q.is_fragmentation_in_progress(MacHeaderType::Generic));

    // Pending subheader now counts into the reported header size.
    assert_eq!(
        q.first_header_bytes(MacHeaderType::Generic),
        GENERIC_HEADER_BYTES + FRAGMENT_SUBHEADER_BYTES
    );
    // 1494 - 292 carried = 1202 payload left, + 6 header + 2 subheader.
    assert_eq!(q.first_required_bytes(MacHeaderType::Generic), 1210);

    // Second fragment: middle of the chain.
    let second = q
        .dequeue_fragment(MacHeaderType::Generic, 300)
        .expect("second fragment");
    assert_eq!(second.fragment, FragmentStage::Middle);
    assert_eq!(second.size_bytes, 300);

    // Whole dequeue now closes the chain.
    let last = q.dequeue(MacHeaderType::Generic).expect("closing fragment");
    assert_eq!(last.fragment, FragmentStage::Last);
    assert_eq!(last.size_bytes, 1494 - 292 - 292 + 8);
    assert!(q.is_empty());
}

#[test]
fn fragment_needs_room_for_header_subheader_and_one_byte() {
    let mut q = MacQueue::new(16);
    q.enqueue(generic(1, 100)).expect("enqueue");

    let overhead = GENERIC_HEADER_BYTES + FRAGMENT_SUBHEADER_BYTES;
    assert!(q.dequeue_fragment(MacHeaderType::Generic, overhead).is_none());
    assert!(!q.is_fragmentation_in_progress(MacHeaderType::Generic));

    let pdu = q
        .dequeue_fragment(MacHeaderType::Generic, overhead + 1)
        .expect("one payload byte fits");
    assert_eq!(pdu.size_bytes, overhead + 1);
    assert_eq!(pdu.fragment, FragmentStage::First);
}

#[test]
fn oversized_fragment_cap_closes_the_chain() {
    let mut q = MacQueue::new(16);
    q.enqueue(generic(1, 50)).expect("enqueue");

    // Cap large enough for all remaining payload: the queue returns the
    // closing fragment and drops the entry.
    let pdu = q
        .dequeue_fragment(MacHeaderType::Generic, 10_000)
        .expect("fragment");
    assert_eq!(pdu.fragment, FragmentStage::Last);
    assert_eq!(pdu.size_bytes, 50 + 8);
    assert!(q.is_empty());
}

#[test]
fn bounded_queue_hands_back_the_rejected_sdu() {
    let mut q = MacQueue::new(1);
    q.enqueue(generic(1, 10)).expect("enqueue");
    let rejected = q.enqueue(generic(2, 10)).expect_err("full");
    assert_eq!(rejected.id, 2);
    assert_eq!(q.len(), 1);
}

#[test]
fn zero_payload_sdu_still_costs_its_header() {
    let mut q = MacQueue::new(4);
    q.enqueue(generic(1, 0)).expect("enqueue");
    assert_eq!(q.first_required_bytes(MacHeaderType::Generic), 6);
    let pdu = q.dequeue(MacHeaderType::Generic).expect("pdu");
    assert_eq!(pdu.size_bytes, 6);
    assert_eq!(pdu.fragment, FragmentStage::Whole);
}
