mod common;

use common::{noiseless_llrs, permute_columns, staircase_code, SMALL_ALIST};
use ldpc_codec::{
    codec::{Decoder, Encoder, ErrorKind},
    decoder::{factory::DecoderImplementation, DecodeStatus},
    puncturing::PuncturingPattern,
    sparse::{Indexing, SparseMatrix},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_message(rng: &mut impl Rng, k: usize) -> Vec<u8> {
    (0..k).map(|_| u8::from(rng.gen::<bool>())).collect()
}

#[test]
fn small_code_scenario() {
    let h = SparseMatrix::from_alist(SMALL_ALIST).unwrap();
    let encoder = Encoder::new(SMALL_ALIST, "").unwrap();
    assert_eq!(encoder.layout().information(), &[0, 1]);
    assert_eq!(encoder.layout().parity(), &[2, 3]);
    let codeword = encoder.encode(&[1, 0]).unwrap();
    assert_eq!(codeword, vec![1, 0, 1, 1]);
    assert!(h.is_codeword(&codeword));

    let decoder = Decoder::new(SMALL_ALIST, "Phif64", "").unwrap();
    let decoded = decoder.decode(&noiseless_llrs(&codeword, 5.0), 10).unwrap();
    assert_eq!(decoded.status, DecodeStatus::Converged);
    assert_eq!(decoded.bits, vec![1, 0]);
}

#[test]
fn small_code_all_messages() {
    let h = SparseMatrix::from_alist(SMALL_ALIST).unwrap();
    let encoder = Encoder::new(SMALL_ALIST, "").unwrap();
    for m in 0..4u8 {
        let message = [m & 1, m >> 1];
        let codeword = encoder.encode(&message).unwrap();
        assert!(h.is_codeword(&codeword));
        assert_eq!(encoder.layout().extract(&codeword), message);
    }
}

#[test]
fn zero_based_alist() {
    let alist = "4 2
2 3
1 2 2 1
3 3
0
0 1
0 1
1
0 1 2
1 2 3
";
    // text constructors read one-based indices
    let err = Encoder::new(alist, "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let err = Decoder::new(alist, "Phif64", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    let h = SparseMatrix::from_alist_with(alist, Indexing::ZeroBased).unwrap();
    assert_eq!(h, SparseMatrix::from_alist(SMALL_ALIST).unwrap());
    let encoder = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap();
    assert_eq!(encoder.encode(&[1, 0]).unwrap(), vec![1, 0, 1, 1]);
}

#[test]
fn all_messages_k16() {
    let staircase = staircase_code(16);
    let n = staircase.num_cols();
    for h in [staircase.clone(), permute_columns(&staircase, |j| n - 1 - j)] {
        let encoder = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap();
        assert_eq!(encoder.message_len(), 16);
        let mut message = [0u8; 16];
        for m in 0..1u32 << 16 {
            for (j, bit) in message.iter_mut().enumerate() {
                *bit = ((m >> j) & 1) as u8;
            }
            let codeword = encoder.encode(&message).unwrap();
            assert_eq!(codeword.len(), n);
            assert!(h.is_codeword(&codeword));
            assert_eq!(encoder.layout().extract(&codeword), message);
        }
    }
}

#[test]
fn encoded_words_satisfy_checks() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let staircase = staircase_code(64);
    let n = staircase.num_cols();
    // staircase encoder, dense encoder with leading information positions,
    // and dense encoder with scattered information positions
    let codes = [
        staircase.clone(),
        permute_columns(&staircase, |j| n - 1 - j),
        permute_columns(&staircase, |j| (5 * j) % n),
    ];
    for h in codes.iter() {
        let encoder = Encoder::from_parts(h, &PuncturingPattern::None).unwrap();
        assert_eq!(encoder.message_len(), 64);
        for _ in 0..20 {
            let message = random_message(&mut rng, encoder.message_len());
            let codeword = encoder.encode(&message).unwrap();
            assert!(h.is_codeword(&codeword));
            assert_eq!(encoder.layout().extract(&codeword), message);
        }
    }
}

#[test]
fn noiseless_round_trip_all_implementations() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let h = permute_columns(&staircase_code(64), |j| (5 * j) % 128);
    let encoder = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap();
    let messages = (0..3)
        .map(|_| random_message(&mut rng, encoder.message_len()))
        .collect::<Vec<_>>();
    for implementation in DecoderImplementation::all() {
        let decoder = Decoder::from_parts(&h, implementation, &PuncturingPattern::None).unwrap();
        for message in messages.iter() {
            let codeword = encoder.encode(message).unwrap();
            let decoded = decoder.decode(&noiseless_llrs(&codeword, 10.0), 20).unwrap();
            assert_eq!(decoded.status, DecodeStatus::Converged, "{implementation}");
            assert_eq!(decoded.iterations, 0);
            assert_eq!(&decoded.bits, message, "{implementation}");
        }
    }
}

#[test]
fn single_error_all_implementations() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let h = staircase_code(64);
    let encoder = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap();
    let jobs = (0..4)
        .map(|_| {
            let message = random_message(&mut rng, 64);
            let mut llrs = noiseless_llrs(&encoder.encode(&message).unwrap(), 4.0);
            let j = rng.gen_range(0..128);
            llrs[j] = -llrs[j] * 0.25;
            (message, llrs)
        })
        .collect::<Vec<_>>();
    for implementation in DecoderImplementation::all() {
        let decoder = Decoder::from_parts(&h, implementation, &PuncturingPattern::None).unwrap();
        for (message, llrs) in jobs.iter() {
            let decoded = decoder.decode(llrs, 20).unwrap();
            assert_eq!(decoded.status, DecodeStatus::Converged, "{implementation}");
            assert!(decoded.iterations >= 1, "{implementation}");
            assert_eq!(&decoded.bits, message, "{implementation}");
        }
    }
}

#[test]
fn large_staircase_code() {
    // DVB-S2 normal frame size
    let h = staircase_code(32400);
    let encoder = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap();
    let decoder = Decoder::from_parts(
        &h,
        "HLMinSumf32".parse().unwrap(),
        &PuncturingPattern::None,
    )
    .unwrap();
    assert_eq!(encoder.message_len(), 32400);
    assert!(encoder.layout().is_leading());
    assert_eq!(decoder.layout(), encoder.layout());

    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let message = random_message(&mut rng, 32400);
    let codeword = encoder.encode(&message).unwrap();
    assert!(h.is_codeword(&codeword));
    let mut llrs = noiseless_llrs(&codeword, 4.0);
    llrs[100] = -llrs[100] * 0.25;
    let decoded = decoder.decode(&llrs, 20).unwrap();
    assert_eq!(decoded.status, DecodeStatus::Converged);
    assert_eq!(decoded.bits, message);
}

#[test]
fn punctured_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let h = staircase_code(64);
    // puncture a quarter of the parity bits
    let pattern: PuncturingPattern = "112-127".parse().unwrap();
    let encoder = Encoder::from_parts(&h, &pattern).unwrap();
    assert_eq!(encoder.output_len(), 112);
    for implementation in ["Phif64", "HLTanhf32", "NormalizedMinSumf64"] {
        let decoder = Decoder::from_parts(&h, implementation.parse().unwrap(), &pattern).unwrap();
        assert_eq!(decoder.input_len(), 112);
        for _ in 0..5 {
            let message = random_message(&mut rng, 64);
            let transmitted = encoder.encode(&message).unwrap();
            let decoded = decoder
                .decode(&noiseless_llrs(&transmitted, 5.0), 50)
                .unwrap();
            assert_eq!(decoded.status, DecodeStatus::Converged, "{implementation}");
            assert_eq!(decoded.bits, message, "{implementation}");
        }
    }
}

#[test]
fn iterations_are_bounded() {
    let h = staircase_code(64);
    let decoder = Decoder::from_parts(
        &h,
        "HLMinSumf64".parse().unwrap(),
        &PuncturingPattern::None,
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for max_iterations in [1, 3, 10] {
        let llrs = (0..128)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect::<Vec<f64>>();
        let decoded = decoder.decode(&llrs, max_iterations).unwrap();
        assert!(decoded.iterations <= max_iterations);
        match decoded.status {
            DecodeStatus::Converged => assert!(decoded.status_code() >= 0),
            DecodeStatus::Exhausted => {
                assert_eq!(decoded.iterations, max_iterations);
                assert_eq!(decoded.status_code(), -1);
            }
        }
        assert_eq!(decoded.bits.len(), 64);
    }
    // all-erasure input cannot satisfy the checks
    let decoded = decoder.decode(&[0.0; 128], 5).unwrap();
    assert_eq!(decoded.status, DecodeStatus::Exhausted);
    let decoded = decoder.decode(&[0.0; 128], 0).unwrap();
    assert_eq!(decoded.status, DecodeStatus::Exhausted);
    assert_eq!(decoded.iterations, 0);
}

#[test]
fn size_errors_leave_instance_usable() {
    let encoder = Encoder::new(SMALL_ALIST, "").unwrap();
    let decoder = Decoder::new(SMALL_ALIST, "HLPhif32", "").unwrap();
    for len in [0, 1, 3, 5] {
        let err = encoder.encode(&vec![0; len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputSize);
        let err = decoder.decode(&vec![1.0; len], 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputSize);
    }
    let codeword = encoder.encode(&[0, 1]).unwrap();
    let decoded = decoder.decode(&noiseless_llrs(&codeword, 3.0), 10).unwrap();
    assert_eq!(decoded.bits, vec![0, 1]);
}

#[test]
fn rank_deficient_code() {
    // every column has weight 2, so the rows add up to zero
    let mut h = SparseMatrix::new(4, 6);
    h.insert_row(0, [0, 1, 3].iter());
    h.insert_row(1, [1, 2, 4].iter());
    h.insert_row(2, [0, 4, 5].iter());
    h.insert_row(3, [2, 3, 5].iter());
    let err = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    let err = Decoder::from_parts(&h, DecoderImplementation::default(), &PuncturingPattern::None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn concurrent_decoding() {
    let h = staircase_code(64);
    let encoder = Encoder::from_parts(&h, &PuncturingPattern::None).unwrap();
    let decoder = Decoder::from_parts(
        &h,
        "HLNormalizedMinSumf32".parse().unwrap(),
        &PuncturingPattern::None,
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let jobs = (0..8)
        .map(|_| {
            let message = random_message(&mut rng, 64);
            let mut llrs = noiseless_llrs(&encoder.encode(&message).unwrap(), 4.0);
            // flip one bit
            let j = rng.gen_range(0..128);
            llrs[j] = -llrs[j] * 0.25;
            (message, llrs)
        })
        .collect::<Vec<_>>();
    let sequential = jobs
        .iter()
        .map(|(_, llrs)| decoder.decode(llrs, 50).unwrap())
        .collect::<Vec<_>>();
    let decoder = &decoder;
    std::thread::scope(|s| {
        let handles = jobs
            .iter()
            .map(|(_, llrs)| s.spawn(move || decoder.decode(llrs, 50).unwrap()))
            .collect::<Vec<_>>();
        for (handle, expected) in handles.into_iter().zip(sequential.iter()) {
            assert_eq!(&handle.join().unwrap(), expected);
        }
    });
    for ((message, _), decoded) in jobs.iter().zip(sequential.iter()) {
        assert_eq!(&decoded.bits, message);
    }
}
