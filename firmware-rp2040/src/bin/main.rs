#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::gpio::{Flex, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Ticker;
use iono_rp2040::config::{
    ANALOG_MIN_VARIATION, ANALOG_STABLE_MS, ANALOG_SUBSCRIPTIONS, DEBOUNCE_MS,
    DIGITAL_SUBSCRIPTIONS, LINKS, OUTPUT_SUBSCRIPTIONS, POLL_PERIOD,
};
use iono_rp2040::{
    BoardConfig, BoardEngine, EmbassyClock, Engine, EventForwarder, EventQueue, RpPins, Sampler,
};
use static_cell::StaticCell;

#[cfg(feature = "rs485-state")]
use defmt::{error, warn};
#[cfg(feature = "rs485-state")]
use embassy_futures::select::{select, Either};
#[cfg(feature = "rs485-state")]
use embassy_rp::uart::{Config as UartConfig, UartTx};
#[cfg(feature = "rs485-state")]
use iono_core::TxEnable;
#[cfg(feature = "rs485-state")]
use iono_rp2040::config::STATE_HEARTBEAT;
#[cfg(feature = "rs485-state")]
use iono_rp2040::{dropped_events, StatePublisher, RS485_BAUDRATE};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// Transitions from the engine task to the report task.
static EVENTS: StaticCell<EventQueue> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Iono RP starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());
    let board = BoardConfig::IONO_RP;

    let events: &'static EventQueue = EVENTS.init(EventQueue::new());

    // --- I/O Setup ---
    let outputs = [
        Output::new(p.PIN_13, Level::Low), // DO1
        Output::new(p.PIN_12, Level::Low), // DO2
        Output::new(p.PIN_11, Level::Low), // DO3
        Output::new(p.PIN_10, Level::Low), // DO4
    ];
    let flex = [
        Flex::new(p.PIN_24), // DI5
        Flex::new(p.PIN_23), // DI6
        Flex::new(p.PIN_7),  // DI5 bypass
        Flex::new(p.PIN_6),  // DI6 bypass
    ];
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let inputs = [
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
        AdcChannel::new_pin(p.PIN_28, Pull::None),
        AdcChannel::new_pin(p.PIN_29, Pull::None),
    ];
    let ao1 = Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, PwmConfig::default());
    let pins = RpPins::new(outputs, flex, adc, inputs, ao1);

    // --- Engine Setup ---
    let mut engine = Engine::new(
        Sampler::new(pins, board),
        EmbassyClock,
        EventForwarder::new(events),
    );
    engine.setup();

    for channel in DIGITAL_SUBSCRIPTIONS.into_iter().chain(OUTPUT_SUBSCRIPTIONS) {
        engine.subscribe_digital(channel, DEBOUNCE_MS);
    }
    for channel in ANALOG_SUBSCRIPTIONS {
        engine.subscribe_analog(channel, ANALOG_STABLE_MS, ANALOG_MIN_VARIATION);
    }
    for (input, output, mode) in LINKS {
        engine.link_di_do(input, output, mode, DEBOUNCE_MS);
    }

    spawner.spawn(engine_task(engine).unwrap());

    // --- RS-485 Setup ---
    #[cfg(feature = "rs485-state")]
    {
        let mut uart_config = UartConfig::default();
        uart_config.baudrate = RS485_BAUDRATE;
        let tx = UartTx::new_blocking(p.UART0, p.PIN_16, uart_config);

        let active_low = board.tx_enable.map_or(true, |line| line.active_low);
        let enable = TxEnable::new(Output::new(p.PIN_25, Level::from(active_low)), active_low);

        let publisher = StatePublisher::new(tx, enable);
        spawner.spawn(report_task(events, publisher).unwrap());
    }

    #[cfg(not(feature = "rs485-state"))]
    spawner.spawn(report_task(events).unwrap());

    info!("{} initialized, polling every {} ms", board.name, POLL_PERIOD.as_millis());
}

/// Engine task - polls all monitored channels on a fixed period.
#[embassy_executor::task]
async fn engine_task(mut engine: BoardEngine) {
    let mut ticker = Ticker::every(POLL_PERIOD);
    loop {
        engine.process();
        ticker.next().await;
    }
}

/// Report task - logs committed transitions.
#[cfg(not(feature = "rs485-state"))]
#[embassy_executor::task]
async fn report_task(events: &'static EventQueue) {
    loop {
        let event = events.receive().await;
        info!("{} = {} at {} ms", event.channel, event.value, event.at_ms);
    }
}

/// Report task - logs committed transitions and publishes state frames.
#[cfg(feature = "rs485-state")]
#[embassy_executor::task]
async fn report_task(
    events: &'static EventQueue,
    mut publisher: StatePublisher<'static, Output<'static>>,
) {
    let mut heartbeat = Ticker::every(STATE_HEARTBEAT);

    loop {
        let sent = match select(events.receive(), heartbeat.next()).await {
            Either::First(event) => {
                info!("{} = {} at {} ms", event.channel, event.value, event.at_ms);
                publisher.record(&event);
                publisher.publish_changes()
            }
            Either::Second(()) => {
                let dropped = dropped_events();
                if dropped > 0 {
                    warn!("{} transitions dropped so far", dropped);
                }
                publisher.publish()
            }
        };

        if let Err(e) = sent {
            error!("RS-485 error: {:?}", e);
        }
    }
}
