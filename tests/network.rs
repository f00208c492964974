use ndarray::{array, Array2};
use stacked_autoencoders::{SdaErr, StackedAutoencoderNetwork};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn one_pretraining_epoch_moves_the_first_layer() -> anyhow::Result<()> {
    init_logger();

    let mut net = StackedAutoencoderNetwork::new(4, &[3], 2, 1234)?;
    let before = net.layers()[0].weights().clone();
    let x = array![[1., 0., 1., 0.], [0., 1., 0., 1.]];

    let cost = net.pretrain_step(0, x.view(), 0.1)?;
    assert!(cost.is_finite() && cost >= 0.);

    let after = net.pretraining_cost(0, x.view())?;
    assert!(after.is_finite() && after >= 0.);
    assert_ne!(net.layers()[0].weights(), &before);
    assert_eq!(
        net.layers()[0].tied_decoder_weights(),
        net.layers()[0].weights().t()
    );

    Ok(())
}

#[test]
fn fine_tuning_separates_a_toy_problem() -> anyhow::Result<()> {
    init_logger();

    let mut net = StackedAutoencoderNetwork::new(4, &[3], 2, 7)?.with_corruption_levels(&[0.])?;
    let x: Array2<f32> = array![
        [1., 1., 0., 0.],
        [0., 0., 1., 1.],
        [1., 1., 0., 0.],
        [0., 0., 1., 1.],
        [1., 1., 0., 0.],
        [0., 0., 1., 1.],
        [1., 1., 0., 0.],
        [0., 0., 1., 1.],
    ];
    let y = array![0, 1, 0, 1, 0, 1, 0, 1];

    for _ in 0..50 {
        net.pretrain_step(0, x.view(), 0.1)?;
    }

    let initial = net.finetune_cost(x.view(), y.view())?;
    assert!((initial - 2f32.ln()).abs() < 1e-5);

    for _ in 0..400 {
        net.finetune_step(x.view(), y.view(), 0.5)?;
    }

    let last = net.finetune_cost(x.view(), y.view())?;
    assert!(last < 0.3, "fine-tuning cost {last}");
    assert_eq!(net.errors(x.view(), y.view())?, 0.);
    assert_eq!(net.predict(x.view())?, y);

    Ok(())
}

#[test]
fn inputs_of_the_wrong_width_are_rejected() -> anyhow::Result<()> {
    let mut net = StackedAutoencoderNetwork::new(4, &[3, 2], 2, 0)?;
    let x = array![[1., 0., 1.]];

    assert!(matches!(
        net.pretrain_step(1, x.view(), 0.1),
        Err(SdaErr::ShapeMismatch { got: 3, expected: 4, .. })
    ));
    assert!(matches!(
        net.finetune_step(x.view(), array![0].view(), 0.1),
        Err(SdaErr::ShapeMismatch { got: 3, expected: 4, .. })
    ));

    Ok(())
}
