//! Disobey 2026 badge bring-up: pin assignment, clocks and the conversions
//! from raw resources into the drivers the game loop uses.
//!
//! ```rust,ignore
//! let peripherals = treasure_hunt::board::init();
//! let resources = treasure_hunt::split_resources!(peripherals);
//! let leds: Leds = resources.leds.into();
//! ```

use esp_hal::{
    Blocking,
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    rmt::{
        Rmt,
        Tx,
        TxChannelConfig,
        TxChannelCreator as _,
    },
    rom,
    time::Rate,
};

use crate::leds::Leds;

/// StaticCell helper: allocates a value into a `static` exactly once.
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

// ── Pin / peripheral assignments ────────────────────────────────────────────

assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        backlight: BacklightResources<'d> {
            led: GPIO19,
        },
        buttons: ButtonResources<'d> {
            left: GPIO21,
            right: GPIO2,
            a: GPIO13,
            b: GPIO38,
        },
        leds: LedResources<'d> {
            power: GPIO17,
            io: GPIO18,
            rmt: RMT,
        },
        vibra: VibrationResources<'d> {
            motor: GPIO20,
        },
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Steps the ESP32-S3 CPU clock through an intermediate frequency, which the
/// hardware requires before reaching the target.
fn set_cpu_clock(cpu_clock_speed: CpuClock) {
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .cpu_per_conf()
        .modify(|_, w| unsafe {
            let _ = w.pll_freq_sel().set_bit();
            w.cpuperiod_sel().bits(match cpu_clock_speed {
                CpuClock::_80MHz => 0,
                CpuClock::_160MHz => 1,
                _ => 2,
            })
        });

    rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
}

/// Initialise the badge and return the raw peripheral set.
///
/// Call once at the top of `main`, then split with [`split_resources!`].
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    set_cpu_clock(CpuClock::_160MHz);
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

// ── Resource → driver conversions ───────────────────────────────────────────

/// Switches the display backlight on and keeps it on.
pub fn backlight_on(res: BacklightResources<'static>) -> Output<'static> {
    Output::new(res.led, Level::High, OutputConfig::default())
}

/// Powers the LED strip and hands back the pin holding that power rail
/// together with the RMT channel driving the data line.
fn led_channel(res: LedResources<'static>) -> (Output<'static>, esp_hal::rmt::Channel<'static, Blocking, Tx>) {
    let power = Output::new(res.power, Level::High, OutputConfig::default());
    let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).expect("RMT clock");
    let tx_config = TxChannelConfig::default().with_clk_divider(1);
    let channel = rmt
        .channel0
        .configure_tx(res.io, tx_config)
        .expect("RMT channel 0");
    (power, channel)
}

impl From<LedResources<'static>> for Leds<'static> {
    fn from(res: LedResources<'static>) -> Self {
        let (power, channel) = led_channel(res);
        Leds::new(channel).with_power(power)
    }
}
