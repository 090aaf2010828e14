use cake_scene::flow::Out;

fn pending(out: &Out<u32>) -> usize {
    match out {
        Out::FutEvent(futures) => futures.len(),
        Out::Empty => 0,
    }
}

#[test]
fn default_output_should_carry_nothing() {
    let out = Out::<u32>::default();
    assert!(matches!(out, Out::Empty));
    assert_eq!(pending(&out), 0);
}

#[test]
fn future_output_should_carry_every_future() {
    let futures: Vec<Box<dyn Future<Output = u32>>> =
        vec![Box::new(async { 1 }), Box::new(async { 2 })];
    let out = Out::FutEvent(futures);
    assert_eq!(pending(&out), 2);
}
