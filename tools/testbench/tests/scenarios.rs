//! End-to-end reconciliation runs against the reference device

use matching_engine::EngineConfig;
use testbench::{
    Dut, Mix, PortsIn, PortsOut, ReferenceDut, ReferenceDutConfig, RunSummary, StimulusConfig,
    StimulusGenerator, Testbench, TestbenchConfig, TestbenchError,
};
use types::command::{Command, CommandKind};
use types::ids::Uid;
use types::price::Price;
use types::response::Status;

fn config(engine: EngineConfig, dut: ReferenceDutConfig) -> TestbenchConfig {
    TestbenchConfig {
        engine,
        dut,
        max_cycles: Some(200_000),
        ..TestbenchConfig::default()
    }
}

fn testbench(engine: EngineConfig, dut: ReferenceDutConfig) -> Testbench<ReferenceDut> {
    let config = config(engine, dut);
    Testbench::new(ReferenceDut::new(config.engine.clone(), config.dut.clone()), config)
}

fn default_testbench() -> Testbench<ReferenceDut> {
    testbench(EngineConfig::default(), ReferenceDutConfig::default())
}

fn buy_limit(uid: u32, quantity: u32, price: &str) -> Command {
    Command::new(uid, CommandKind::BuyLimit { quantity, price: Price::parse(price) })
}

fn sell_limit(uid: u32, quantity: u32, price: &str) -> Command {
    Command::new(uid, CommandKind::SellLimit { quantity, price: Price::parse(price) })
}

fn cancel(uid: u32, target: u32) -> Command {
    Command::new(uid, CommandKind::Cancel { target: Uid::new(target) })
}

fn assert_books_agree(tb: &Testbench<ReferenceDut>) {
    assert_eq!(tb.oracle().snapshot(), tb.dut().engine().snapshot());
}

// Smoke

#[test]
fn test_smoke_table_sort() {
    let mut tb = default_testbench();
    tb.push_back(buy_limit(0, 100, "100.55"));
    tb.push_back(buy_limit(1, 100, "100.60"));
    tb.push_back(buy_limit(2, 100, "100.40"));
    for uid in 3..6 {
        tb.push_back(Command::new(uid, CommandKind::PopTopBid));
    }

    let summary = tb.run().unwrap();

    assert_eq!(summary.commands_issued, 6);
    assert_eq!(summary.acks_checked, 6);
    assert_eq!(summary.trades_checked, 0);
    assert!(tb.oracle().snapshot().is_empty());
}

#[test]
fn test_smoke_trade_both_directions() {
    let mut tb = default_testbench();
    tb.push_back(buy_limit(0, 100, "200.00"));
    tb.push_back(sell_limit(1, 100, "100.00"));
    tb.push_back(sell_limit(2, 100, "100.00"));
    tb.push_back(buy_limit(3, 100, "200.00"));

    let summary = tb.run().unwrap();

    assert_eq!(summary.acks_checked, 4);
    assert_eq!(summary.trades_checked, 2);
    assert!(tb.dut().engine().snapshot().is_empty());
}

#[test]
fn test_smoke_cancel() {
    let mut tb = default_testbench();
    tb.push_back(buy_limit(0x20, 100, "200.00"));
    tb.push_back(cancel(0x30, 0x20));
    tb.push_back(cancel(0x31, 0x20));

    let summary = tb.run().unwrap();

    assert_eq!(summary.acks_checked, 3);
    assert!(tb.oracle().book().is_empty());
}

#[test]
fn test_smoke_nop_and_top_of_book() {
    let mut tb = default_testbench();
    tb.push_back(Command::new(0, CommandKind::Nop));
    tb.push_back(Command::new(1, CommandKind::QueryBidAsk));
    tb.push_back(buy_limit(2, 10, "99.00"));
    tb.push_back(sell_limit(3, 10, "101.00"));
    tb.push_back(Command::new(4, CommandKind::QueryBidAsk));
    tb.push_back(Command::new(5, CommandKind::PopTopAsk));
    tb.push_back(Command::new(6, CommandKind::PopTopAsk));

    let summary = tb.run().unwrap();

    assert_eq!(summary.acks_checked, 7);
    assert_books_agree(&tb);
}

// Range queries

#[test]
fn test_query_bids_basic() {
    let mut tb = default_testbench();
    let prices = ["98.00", "99.50", "100.00", "100.25", "101.00"];
    for (uid, price) in prices.iter().enumerate() {
        tb.push_back(buy_limit(uid as u32, 10 * (uid as u32 + 1), price));
    }
    let queries = ["97.00", "100.00", "100.26", "120.00"];
    for (i, price) in queries.iter().enumerate() {
        tb.push_back(Command::new(
            10 + i as u32,
            CommandKind::QueryBidsAtOrAbove { price: Price::parse(price) },
        ));
        tb.push_back(Command::new(
            20 + i as u32,
            CommandKind::QueryAsksAtOrBelow { price: Price::parse(price) },
        ));
    }

    let summary = tb.run().unwrap();

    assert_eq!(summary.acks_checked, 5 + 8);
    assert_eq!(tb.oracle().resting_quantity(), 150);
}

// Market orders

fn market_reject_run(buy: bool) -> RunSummary {
    let mut tb = default_testbench();
    for uid in 0..1024 {
        let kind = if buy {
            CommandKind::BuyMarket { quantity: 10 }
        } else {
            CommandKind::SellMarket { quantity: 10 }
        };
        tb.push_back(Command::new(uid, kind));
    }
    for target in 0..16 {
        tb.push_back(cancel(1024 + target, target));
    }
    let summary = tb.run().unwrap();
    assert!(tb.oracle().book().is_empty());
    summary
}

#[test]
fn test_market_buy_queue_rejects_overflow() {
    let summary = market_reject_run(true);
    assert_eq!(summary.acks_checked, 1024 + 16);
    assert_eq!(summary.trades_checked, 0);
}

#[test]
fn test_market_sell_queue_rejects_overflow() {
    let summary = market_reject_run(false);
    assert_eq!(summary.acks_checked, 1024 + 16);
}

#[test]
fn test_market_against_market() {
    let mut tb = default_testbench();
    tb.push_back(Command::new(0, CommandKind::BuyMarket { quantity: 100 }));
    for uid in 1..=11 {
        tb.push_back(Command::new(uid, CommandKind::SellMarket { quantity: 10 }));
    }

    let summary = tb.run().unwrap();

    assert_eq!(summary.trades_checked, 10);
    assert_eq!(tb.oracle().book().market_asks.len(), 1);
    assert_books_agree(&tb);
}

#[test]
fn test_market_sweeps_limits() {
    let mut tb = default_testbench();
    tb.push_back(sell_limit(0, 30, "100.00"));
    tb.push_back(sell_limit(1, 30, "101.00"));
    tb.push_back(sell_limit(2, 30, "99.00"));
    tb.push_back(Command::new(3, CommandKind::BuyMarket { quantity: 100 }));

    let summary = tb.run().unwrap();

    assert_eq!(summary.trades_checked, 3);
    assert_eq!(tb.oracle().book().market_bids.len(), 1);
    assert_books_agree(&tb);
}

#[test]
fn test_limit_meets_waiting_market() {
    let mut tb = default_testbench();
    tb.push_back(Command::new(0, CommandKind::SellMarket { quantity: 50 }));
    tb.push_back(buy_limit(1, 20, "100.00"));
    tb.push_back(buy_limit(2, 20, "90.00"));
    tb.push_back(buy_limit(3, 20, "110.00"));

    let summary = tb.run().unwrap();

    assert_eq!(summary.trades_checked, 3);
    assert_books_agree(&tb);
}

#[test]
fn test_market_counts_in_range_queries() {
    let mut tb = default_testbench();
    for uid in 0..4 {
        tb.push_back(Command::new(uid, CommandKind::BuyMarket { quantity: 5 }));
    }
    tb.push_back(Command::new(
        4,
        CommandKind::QueryBidsAtOrAbove { price: Price::parse("100.00") },
    ));
    for uid in 5..9 {
        tb.push_back(Command::new(uid, CommandKind::SellMarket { quantity: 1 }));
    }
    tb.push_back(Command::new(
        9,
        CommandKind::QueryAsksAtOrBelow { price: Price::parse("100.00") },
    ));

    let summary = tb.run().unwrap();

    assert_eq!(summary.acks_checked, 10);
    assert_eq!(summary.trades_checked, 4);
}

// Conditional orders

fn stop_kinds(trigger: Price) -> [CommandKind; 4] {
    [
        CommandKind::BuyStopLoss { quantity: 100, trigger },
        CommandKind::SellStopLoss { quantity: 100, trigger },
        CommandKind::BuyStopLimit { quantity: 100, price: trigger, trigger },
        CommandKind::SellStopLimit { quantity: 100, price: trigger, trigger },
    ]
}

#[test]
fn test_conditional_cancel() {
    // an empty book never triggers anything
    for (i, kind) in stop_kinds(Price::parse("100.00")).into_iter().enumerate() {
        let mut tb = default_testbench();
        tb.push_back(Command::new(0, kind));
        tb.push_back(cancel(1, 0));
        tb.push_back(cancel(2, 0));

        let summary = tb.run().unwrap();

        assert_eq!(summary.acks_checked, 3, "stop kind {i}");
        assert_eq!(summary.maturations, 0);
        assert!(tb.oracle().pending_conditionals().is_empty());
    }
}

#[test]
fn test_conditional_capacity_reject() {
    let mut tb = default_testbench();
    for uid in 0..100 {
        tb.push_back(Command::new(
            uid,
            CommandKind::BuyStopLoss { quantity: 10, trigger: Price::parse("200.00") },
        ));
    }

    let summary = tb.run().unwrap();

    assert_eq!(summary.acks_checked, 100);
    assert_eq!(tb.oracle().pending_conditionals().len(), 16);
    assert_eq!(summary.maturations, 0);
}

#[test]
fn test_buy_stop_below_trigger_stays_pending() {
    let mut tb = default_testbench();
    tb.push_back(sell_limit(0, 100, "99.00"));
    tb.push_back(Command::new(
        1,
        CommandKind::BuyStopLimit {
            quantity: 100,
            price: Price::parse("100.00"),
            trigger: Price::parse("100.00"),
        },
    ));

    let summary = tb.run().unwrap();

    assert_eq!(summary.maturations, 0);
    assert_eq!(tb.oracle().pending_conditionals().len(), 1);
    assert_books_agree(&tb);
}

#[test]
fn test_buy_stop_loss_matures_and_trades() {
    let mut tb = default_testbench();
    tb.push_back(Command::new(
        0,
        CommandKind::BuyStopLoss { quantity: 10, trigger: Price::parse("100.00") },
    ));
    tb.push_back(sell_limit(1, 10, "101.00"));

    let summary = tb.run().unwrap();

    assert_eq!(summary.maturations, 1);
    assert_eq!(summary.trades_checked, 1);
    // stop acknowledgement, sell acknowledgement, matured market order
    assert_eq!(summary.acks_checked, 3);
    assert!(tb.oracle().snapshot().is_empty());
    assert_books_agree(&tb);
}

#[test]
fn test_sell_stop_limit_matures_and_rests() {
    let mut tb = default_testbench();
    tb.push_back(buy_limit(0, 10, "99.00"));
    tb.push_back(Command::new(
        1,
        CommandKind::SellStopLimit {
            quantity: 5,
            price: Price::parse("105.00"),
            trigger: Price::parse("100.00"),
        },
    ));

    let summary = tb.run().unwrap();

    assert_eq!(summary.maturations, 1);
    assert_eq!(summary.trades_checked, 0);
    assert_eq!(tb.oracle().best_ask(), Some(Price::parse("105.00")));
    assert_books_agree(&tb);
}

#[test]
fn test_cancel_after_maturation_misses() {
    let mut tb = default_testbench();
    tb.push_back(buy_limit(0, 10, "99.00"));
    tb.push_back(Command::new(
        1,
        CommandKind::SellStopLoss { quantity: 10, trigger: Price::parse("100.00") },
    ));
    tb.push_back(Command::new(2, CommandKind::Nop));
    tb.push_back(Command::new(3, CommandKind::Nop));
    tb.push_back(cancel(4, 1));

    let summary = tb.run().unwrap();

    assert_eq!(summary.maturations, 1);
    assert_eq!(summary.trades_checked, 1);
    assert!(tb.oracle().snapshot().is_empty());
}

// Random regressions

fn regress(mix: Mix, count: usize, seed: u64, dut: ReferenceDutConfig) -> RunSummary {
    let mut generator = StimulusGenerator::new(mix.bag(), StimulusConfig { seed, ..StimulusConfig::default() });
    let mut tb = testbench(EngineConfig::default(), dut);
    tb.extend(generator.generate(count));

    let summary = tb.run().unwrap();

    assert_eq!(summary.commands_issued, count as u64);
    assert_books_agree(&tb);
    summary
}

#[test]
fn test_regress_limit_mix() {
    let summary = regress(Mix::Lm, 4096, 1, ReferenceDutConfig::default());
    assert!(summary.trades_checked > 0);
}

#[test]
fn test_regress_market_mix() {
    regress(Mix::Mk, 2000, 2, ReferenceDutConfig::default());
}

#[test]
fn test_regress_conditional_mix() {
    regress(Mix::Cn, 4096, 3, ReferenceDutConfig::default());
}

#[test]
fn test_regress_all_opcodes() {
    regress(Mix::All, 4096, 4, ReferenceDutConfig::default());
}

#[test]
fn test_regress_heavy_reordering_and_stalls() {
    let dut = ReferenceDutConfig {
        seed: 99,
        latency: 0,
        max_jitter: 16,
        stall_probability: 0.3,
    };
    let summary = regress(Mix::All, 2000, 5, dut);
    assert!(summary.stall_cycles > 0);
}

#[test]
fn test_regress_small_tables() {
    let engine = EngineConfig {
        bid_depth: 3,
        ask_depth: 3,
        market_bid_depth: 2,
        market_ask_depth: 2,
        conditional_depth: 2,
    };
    let mut generator = StimulusGenerator::new(Mix::All.bag(), StimulusConfig::default());
    let mut tb = testbench(engine, ReferenceDutConfig::default());
    tb.extend(generator.generate(2000));

    tb.run().unwrap();

    assert_books_agree(&tb);
}

// Faulty devices

/// Wraps the reference device and tampers with what it reports
struct Faulty<F: Fn(u64, &mut PortsOut)> {
    inner: ReferenceDut,
    edges: u64,
    last_clk: bool,
    tamper: F,
}

impl<F: Fn(u64, &mut PortsOut)> Faulty<F> {
    fn new(config: &TestbenchConfig, tamper: F) -> Self {
        Self {
            inner: ReferenceDut::new(config.engine.clone(), config.dut.clone()),
            edges: 0,
            last_clk: false,
            tamper,
        }
    }
}

impl<F: Fn(u64, &mut PortsOut)> Dut for Faulty<F> {
    fn poke(&mut self, inputs: &PortsIn) {
        self.inner.poke(inputs);
        if inputs.clk && !self.last_clk {
            self.edges += 1;
        }
        self.last_clk = inputs.clk;
    }

    fn peek(&self) -> PortsOut {
        let mut out = self.inner.peek();
        (self.tamper)(self.edges, &mut out);
        out
    }

    fn eval(&mut self) {
        self.inner.eval();
    }
}

fn faulty_run<F: Fn(u64, &mut PortsOut)>(max_cycles: u64, tamper: F) -> Result<RunSummary, TestbenchError> {
    let config = TestbenchConfig {
        dut: ReferenceDutConfig {
            stall_probability: 0.0,
            ..ReferenceDutConfig::default()
        },
        max_cycles: Some(max_cycles),
        ..TestbenchConfig::default()
    };
    let mut tb = Testbench::new(Faulty::new(&config, tamper), config);
    tb.push_back(buy_limit(0, 10, "100.00"));
    tb.push_back(Command::new(3, CommandKind::Nop));
    tb.run()
}

#[test]
fn test_detects_corrupted_status() {
    let err = faulty_run(1000, |_, out| {
        if out.rsp_vld && out.rsp_uid == 3 {
            out.rsp_status = Status::Reject.code();
        }
    })
    .unwrap_err();

    assert!(matches!(err, TestbenchError::Mismatch { .. }), "{err}");
}

#[test]
fn test_detects_dropped_response() {
    let err = faulty_run(200, |_, out| {
        if out.rsp_uid == 3 {
            out.rsp_vld = false;
        }
    })
    .unwrap_err();

    match err {
        TestbenchError::Outstanding { remaining, cycle, .. } => {
            assert_eq!(remaining, 1);
            assert_eq!(cycle, 200);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_detects_unexpected_uid() {
    let err = faulty_run(1000, |_, out| {
        if out.rsp_vld && out.rsp_uid == 3 {
            out.rsp_uid = 99;
        }
    })
    .unwrap_err();

    assert!(matches!(err, TestbenchError::UnexpectedResponse { .. }), "{err}");
}

#[test]
fn test_detects_trade_with_none_predicted() {
    let err = faulty_run(1000, |edges, out| {
        if edges == 22 {
            *out = PortsOut {
                rsp_vld: true,
                rsp_uid: Uid::TRADE_SENTINEL.value(),
                rsp_trade_bid_uid: 0,
                rsp_trade_ask_uid: 7,
                rsp_trade_quantity: 10,
                ..*out
            };
        }
    })
    .unwrap_err();

    match err {
        TestbenchError::UnexpectedResponse { actual, .. } => assert!(actual.is_trade()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_detects_unknown_maturation() {
    let err = faulty_run(1000, |edges, out| {
        if edges == 22 {
            out.cn_mature_vld = true;
            out.cn_mature_uid = 42;
        }
    })
    .unwrap_err();

    match err {
        TestbenchError::UnknownMaturation { uid, .. } => assert_eq!(uid, Uid::new(42)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_error_reports_cycle() {
    let err = faulty_run(1000, |_, out| {
        if out.rsp_vld && out.rsp_uid == 0 {
            out.rsp_status = Status::Bad.code();
        }
    })
    .unwrap_err();

    assert!(err.cycle().is_some_and(|cycle| cycle > 20));
}
