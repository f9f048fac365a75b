// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use cortex_m::delay::Delay;
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use delta6_sensors::{
    config,
    hw::{BitBangBus, BoardPins, Console, CycleDelay, Led, Sector, StatusLeds},
    log_info,
    sensors::SensorBank,
    storage::{CalibrationStore, Journal},
    App,
};

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let sysclk = clocks.sysclk().raw();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE, dp.GPIOF);

    // USART1 (DBG)
    let debug_cfg = Config {
        baud_rate: config::DEBUG_BAUD.bps(),
        ..Default::default()
    };
    let debug = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        debug_cfg,
    );
    let mut console = Console::new(debug);

    // USART2 (host link)
    let host_cfg = Config {
        baud_rate: config::HOST_BAUD.bps(),
        ..Default::default()
    };
    let host = Serial::new(
        dp.USART2,
        (pins.usart2.tx, pins.usart2.rx),
        &clocks,
        host_cfg,
    );
    let (mut host_tx, mut host_rx) = host.split();

    log_info!(console, "delta6 sensor board up, sysclk = {} Hz", sysclk);

    // Sensors
    let bus = BitBangBus::new(
        pins.sensors.sck,
        CycleDelay::new(sysclk),
        config::BUS_HALF_PERIOD_US,
    );
    let bank = SensorBank::attach(bus, pins.sensors.lines);

    // Calibration table
    let journal: Journal<_, { config::EEPROM_SIZE }> = Journal::mount(Sector::new(dp.FLASH));
    let store = CalibrationStore::new(journal);

    let mut app = App::new(bank, store, console);

    // LED
    let mut leds = StatusLeds::new(
        Led::active_low(pins.leds.red),
        Led::active_low(pins.leds.green),
        config::HEARTBEAT_TICKS,
    );
    let mut delay = Delay::new(cp.SYST, sysclk);

    loop {
        let failed = app.tick(&mut host_rx, &mut host_tx);
        leds.update(!failed.is_empty());
        delay.delay_ms(config::LOOP_PERIOD_MS);
    }
}
