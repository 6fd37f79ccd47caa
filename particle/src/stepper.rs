use config::{STEP_ABS_TOL, STEP_REL_TOL};

use self::tableau::*;

const SAFETY_FACTOR: f64 = 0.9;
/// Step growth is clamped into [1/MAX_SCALE_DOWN, MAX_SCALE_UP].
const MAX_SCALE_UP: f64 = 6.0;
const MAX_SCALE_DOWN: f64 = 3.0;
/// Rejections in a row before the step is declared underflowed.
const MAX_REJECTS: u32 = 100;

/// Dormand-Prince 8(5,3) coefficients (Hairer, Nørsett & Wanner, dop853).
#[rustfmt::skip]
mod tableau {
    pub(super) const C2: f64 = 0.526001519587677318785587544488e-01;
    pub(super) const C3: f64 = 0.789002279381515978178381316732e-01;
    pub(super) const C4: f64 = 0.118350341907227396726757197510e+00;
    pub(super) const C5: f64 = 0.281649658092772603273242802490e+00;
    pub(super) const C6: f64 = 0.333333333333333333333333333333e+00;
    pub(super) const C7: f64 = 0.25e+00;
    pub(super) const C8: f64 = 0.307692307692307692307692307692e+00;
    pub(super) const C9: f64 = 0.651282051282051282051282051282e+00;
    pub(super) const C10: f64 = 0.6e+00;
    pub(super) const C11: f64 = 0.857142857142857142857142857142e+00;
    pub(super) const C14: f64 = 0.1e+00;
    pub(super) const C15: f64 = 0.2e+00;
    pub(super) const C16: f64 = 0.777777777777777777777777777778e+00;

    pub(super) const B1: f64 = 5.42937341165687622380535766363e-2;
    pub(super) const B6: f64 = 4.45031289275240888144113950566e0;
    pub(super) const B7: f64 = 1.89151789931450038304281599044e0;
    pub(super) const B8: f64 = -5.8012039600105847814672114227e0;
    pub(super) const B9: f64 = 3.1116436695781989440891606237e-1;
    pub(super) const B10: f64 = -1.52160949662516078556178806805e-1;
    pub(super) const B11: f64 = 2.01365400804030348374776537501e-1;
    pub(super) const B12: f64 = 4.47106157277725905176885569043e-2;

    // Embedded 3rd-order estimator over stages 1, 9, 12.
    pub(super) const BHH1: f64 = 0.244094488188976377952755905512e+00;
    pub(super) const BHH2: f64 = 0.733846688281611857341361741547e+00;
    pub(super) const BHH3: f64 = 0.220588235294117647058823529412e-01;

    // Embedded 5th-order error weights.
    pub(super) const ER1: f64 = 0.1312004499419488073250102996e-01;
    pub(super) const ER6: f64 = -0.1225156446376204440720569753e+01;
    pub(super) const ER7: f64 = -0.4957589496572501915214079952e+00;
    pub(super) const ER8: f64 = 0.1664377182454986536961530415e+01;
    pub(super) const ER9: f64 = -0.3503288487499736816886487290e+00;
    pub(super) const ER10: f64 = 0.3341791187130174790297318841e+00;
    pub(super) const ER11: f64 = 0.8192320648511571246570742613e-01;
    pub(super) const ER12: f64 = -0.2235530786388629525884427845e-01;

    pub(super) const A21: f64 = 5.26001519587677318785587544488e-2;
    pub(super) const A31: f64 = 1.97250569845378994544595329183e-2;
    pub(super) const A32: f64 = 5.91751709536136983633785987549e-2;
    pub(super) const A41: f64 = 2.95875854768068491816892993775e-2;
    pub(super) const A43: f64 = 8.87627564304205475450678981324e-2;
    pub(super) const A51: f64 = 2.41365134159266685502369798665e-1;
    pub(super) const A53: f64 = -8.84549479328286085344864962717e-1;
    pub(super) const A54: f64 = 9.24834003261792003115737966543e-1;
    pub(super) const A61: f64 = 3.7037037037037037037037037037e-2;
    pub(super) const A64: f64 = 1.70828608729473871279604482173e-1;
    pub(super) const A65: f64 = 1.25467687566822425016691814123e-1;
    pub(super) const A71: f64 = 3.7109375e-2;
    pub(super) const A74: f64 = 1.70252211019544039314978060272e-1;
    pub(super) const A75: f64 = 6.02165389804559606850219397283e-2;
    pub(super) const A76: f64 = -1.7578125e-2;

    pub(super) const A81: f64 = 3.70920001185047927108779319836e-2;
    pub(super) const A84: f64 = 1.70383925712239993810214054705e-1;
    pub(super) const A85: f64 = 1.07262030446373284651809199168e-1;
    pub(super) const A86: f64 = -1.53194377486244017527936158236e-2;
    pub(super) const A87: f64 = 8.27378916381402288758473766002e-3;
    pub(super) const A91: f64 = 6.24110958716075717114429577812e-1;
    pub(super) const A94: f64 = -3.36089262944694129406857109825e0;
    pub(super) const A95: f64 = -8.68219346841726006818189891453e-1;
    pub(super) const A96: f64 = 2.75920996994467083049415600797e1;
    pub(super) const A97: f64 = 2.01540675504778934086186788979e1;
    pub(super) const A98: f64 = -4.34898841810699588477366255144e1;
    pub(super) const A101: f64 = 4.77662536438264365890433908527e-1;
    pub(super) const A104: f64 = -2.48811461997166764192642586468e0;
    pub(super) const A105: f64 = -5.90290826836842996371446475743e-1;
    pub(super) const A106: f64 = 2.12300514481811942347288949897e1;
    pub(super) const A107: f64 = 1.52792336328824235832596922938e1;
    pub(super) const A108: f64 = -3.32882109689848629194453265587e1;
    pub(super) const A109: f64 = -2.03312017085086261358222928593e-2;
    pub(super) const A111: f64 = -9.3714243008598732571704021658e-1;
    pub(super) const A114: f64 = 5.18637242884406370830023853209e0;
    pub(super) const A115: f64 = 1.09143734899672957818500254654e0;
    pub(super) const A116: f64 = -8.14978701074692612513997267357e0;
    pub(super) const A117: f64 = -1.85200656599969598641566180701e1;
    pub(super) const A118: f64 = 2.27394870993505042818970056734e1;
    pub(super) const A119: f64 = 2.49360555267965238987089396762e0;
    pub(super) const A1110: f64 = -3.0467644718982195003823669022e0;
    pub(super) const A121: f64 = 2.27331014751653820792359768449e0;
    pub(super) const A124: f64 = -1.05344954667372501984066689879e1;
    pub(super) const A125: f64 = -2.00087205822486249909675718444e0;
    pub(super) const A126: f64 = -1.79589318631187989172765950534e1;
    pub(super) const A127: f64 = 2.79488845294199600508499808837e1;
    pub(super) const A128: f64 = -2.85899827713502369474065508674e0;
    pub(super) const A129: f64 = -8.87285693353062954433549289258e0;
    pub(super) const A1210: f64 = 1.23605671757943030647266201528e1;
    pub(super) const A1211: f64 = 6.43392746015763530355970484046e-1;

    // Extra stages of the order-7 continuous extension.
    pub(super) const A141: f64 = 5.61675022830479523392909219681e-2;
    pub(super) const A147: f64 = 2.53500210216624811088794765333e-1;
    pub(super) const A148: f64 = -2.46239037470802489917441475441e-1;
    pub(super) const A149: f64 = -1.24191423263816360469010140626e-1;
    pub(super) const A1410: f64 = 1.5329179827876569731206322685e-1;
    pub(super) const A1411: f64 = 8.20105229563468988491666602057e-3;
    pub(super) const A1412: f64 = 7.56789766054569976138603589584e-3;
    pub(super) const A1413: f64 = -8.298e-3;

    pub(super) const A151: f64 = 3.18346481635021405060768473261e-2;
    pub(super) const A156: f64 = 2.83009096723667755288322961402e-2;
    pub(super) const A157: f64 = 5.35419883074385676223797384372e-2;
    pub(super) const A158: f64 = -5.49237485713909884646569340306e-2;
    pub(super) const A1511: f64 = -1.08347328697249322858509316994e-4;
    pub(super) const A1512: f64 = 3.82571090835658412954920192323e-4;
    pub(super) const A1513: f64 = -3.40465008687404560802977114492e-4;
    pub(super) const A1514: f64 = 1.41312443674632500278074618366e-1;

    pub(super) const A161: f64 = -4.28896301583791923408573538692e-1;
    pub(super) const A166: f64 = -4.69762141536116384314449447206e0;
    pub(super) const A167: f64 = 7.68342119606259904184240953878e0;
    pub(super) const A168: f64 = 4.06898981839711007970213554331e0;
    pub(super) const A169: f64 = 3.56727187455281109270669543021e-1;
    pub(super) const A1613: f64 = -1.39902416515901462129418009734e-3;
    pub(super) const A1614: f64 = 2.9475147891527723389556272149e0;
    pub(super) const A1615: f64 = -9.15095847217987001081870187138e0;

    pub(super) const D41: f64 = -0.84289382761090128651353491142e+01;
    pub(super) const D46: f64 = 0.56671495351937776962531783590e+00;
    pub(super) const D47: f64 = -0.30689499459498916912797304727e+01;
    pub(super) const D48: f64 = 0.23846676565120698287728149680e+01;
    pub(super) const D49: f64 = 0.21170345824450282767155149946e+01;
    pub(super) const D410: f64 = -0.87139158377797299206789907490e+00;
    pub(super) const D411: f64 = 0.22404374302607882758541771650e+01;
    pub(super) const D412: f64 = 0.63157877876946881815570249290e+00;
    pub(super) const D413: f64 = -0.88990336451333310820698117400e-01;
    pub(super) const D414: f64 = 0.18148505520854727256656404962e+02;
    pub(super) const D415: f64 = -0.91946323924783554000451984436e+01;
    pub(super) const D416: f64 = -0.44360363875948939664310572000e+01;

    pub(super) const D51: f64 = 0.10427508642579134603413151009e+02;
    pub(super) const D56: f64 = 0.24228349177525818288430175319e+03;
    pub(super) const D57: f64 = 0.16520045171727028198505394887e+03;
    pub(super) const D58: f64 = -0.37454675472269020279518312152e+03;
    pub(super) const D59: f64 = -0.22113666853125306036270938578e+02;
    pub(super) const D510: f64 = 0.77334326684722638389603898808e+01;
    pub(super) const D511: f64 = -0.30674084731089398182061213626e+02;
    pub(super) const D512: f64 = -0.93321305264302278729567221706e+01;
    pub(super) const D513: f64 = 0.15697238121770843886131091075e+02;
    pub(super) const D514: f64 = -0.31139403219565177677282850411e+02;
    pub(super) const D515: f64 = -0.93529243588444783865713862664e+01;
    pub(super) const D516: f64 = 0.35816841486394083752465898540e+02;

    pub(super) const D61: f64 = 0.19985053242002433820987653617e+02;
    pub(super) const D66: f64 = -0.38703730874935176555105901742e+03;
    pub(super) const D67: f64 = -0.18917813819516756882830838328e+03;
    pub(super) const D68: f64 = 0.52780815920542364900561016686e+03;
    pub(super) const D69: f64 = -0.11573902539959630126141871134e+02;
    pub(super) const D610: f64 = 0.68812326946963000169666922661e+01;
    pub(super) const D611: f64 = -0.10006050966910838403183860980e+01;
    pub(super) const D612: f64 = 0.77771377980534432092869265740e+00;
    pub(super) const D613: f64 = -0.27782057523535084065932004339e+01;
    pub(super) const D614: f64 = -0.60196695231264120758267380846e+02;
    pub(super) const D615: f64 = 0.84320405506677161018159903784e+02;
    pub(super) const D616: f64 = 0.11992291136182789328035130030e+02;

    pub(super) const D71: f64 = -0.25693933462703749003312586129e+02;
    pub(super) const D76: f64 = -0.15418974869023643374053993627e+03;
    pub(super) const D77: f64 = -0.23152937917604549567536039109e+03;
    pub(super) const D78: f64 = 0.35763911791061412378285349910e+03;
    pub(super) const D79: f64 = 0.93405324183624310003907691704e+02;
    pub(super) const D710: f64 = -0.37458323136451633156875139351e+02;
    pub(super) const D711: f64 = 0.10409964950896230045147246184e+03;
    pub(super) const D712: f64 = 0.29840293426660503123344363579e+02;
    pub(super) const D713: f64 = -0.43533456590011143754432175058e+02;
    pub(super) const D714: f64 = 0.96324553959188282948394950600e+02;
    pub(super) const D715: f64 = -0.39177261675615439165231486172e+02;
    pub(super) const D716: f64 = -0.14972683625798562581422125276e+03;
}

#[derive(thiserror::Error, Debug)]
pub enum StepperError {
    /// The error estimate came out NaN or infinite.
    #[error("non-finite error estimate at t = {t}")]
    NonFinite { t: f64 },

    /// The controller shrank the step below resolution.
    #[error("step size underflow at t = {t} (h = {h})")]
    StepUnderflow { t: f64, h: f64 },
}

/// The right-hand side of an ODE system: the single capability the stepper
/// needs. Blanket-implemented for closures.
pub trait Derivatives<const N: usize> {
    fn derivs(&mut self, t: f64, y: &[f64; N]) -> [f64; N];
}

impl<F, const N: usize> Derivatives<N> for F
where
    F: FnMut(f64, &[f64; N]) -> [f64; N],
{
    fn derivs(&mut self, t: f64, y: &[f64; N]) -> [f64; N] {
        self(t, y)
    }
}

/// Result of one accepted step.
#[derive(Clone, Copy, Debug)]
pub struct StepOutcome {
    /// The step that was actually taken.
    pub h_did: f64,
    /// The controller's suggestion for the next step.
    pub h_next: f64,
}

/// Explicit Dormand-Prince 8(5,3) with an order-7 continuous extension over
/// the last accepted step.
pub struct Dop853<const N: usize> {
    t: f64,
    y: [f64; N],
    t_old: f64,
    h_did: f64,
    /// Continuous-extension coefficients of the last accepted step.
    cont: [[f64; N]; 8],
}

impl<const N: usize> Dop853<N> {
    pub fn new(t0: f64, y0: [f64; N]) -> Self {
        Self {
            t: t0,
            y: y0,
            t_old: t0,
            h_did: 0.0,
            cont: [[f64::NAN; N]; 8],
        }
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn t_old(&self) -> f64 {
        self.t_old
    }

    pub fn y(&self) -> &[f64; N] {
        &self.y
    }

    pub fn h_did(&self) -> f64 {
        self.h_did
    }

    /// Restarts the stepper from a new state, discarding the last step.
    /// Used after a hit handler truncates the trajectory.
    pub fn reset(&mut self, t: f64, y: [f64; N]) {
        self.t = t;
        self.y = y;
        self.t_old = t;
        self.h_did = 0.0;
        self.cont = [[f64::NAN; N]; 8];
    }

    /// Advances by at most `h_suggested`, shrinking the step until the
    /// embedded error estimate passes the tolerances.
    pub fn step(
        &mut self,
        h_suggested: f64,
        sys: &mut impl Derivatives<N>,
    ) -> Result<StepOutcome, StepperError> {
        let mut h = h_suggested;
        let k1 = sys.derivs(self.t, &self.y);

        let mut rejects = 0;
        loop {
            if !h.is_finite() || self.t + h == self.t {
                return Err(StepperError::StepUnderflow { t: self.t, h });
            }

            let (y_new, err, ks) = self.try_step(h, &k1, sys)?;

            let fac11 = err.powf(0.125);
            if err <= 1.0 {
                // Accept: prepare dense output, then move.
                let h_next = h / (fac11 / SAFETY_FACTOR).clamp(1.0 / MAX_SCALE_UP, MAX_SCALE_DOWN);
                self.prepare_dense(h, &k1, &ks, &y_new, sys);
                self.t_old = self.t;
                self.h_did = h;
                self.t += h;
                self.y = y_new;
                return Ok(StepOutcome { h_did: h, h_next });
            }

            rejects += 1;
            if rejects > MAX_REJECTS {
                return Err(StepperError::StepUnderflow { t: self.t, h });
            }
            h /= (fac11 / SAFETY_FACTOR).min(MAX_SCALE_DOWN);
        }
    }

    /// Runs the 12 integration stages for step `h`, returning the candidate
    /// state, the scaled error norm and the stage derivatives.
    #[allow(clippy::needless_range_loop)]
    fn try_step(
        &self,
        h: f64,
        k1: &[f64; N],
        sys: &mut impl Derivatives<N>,
    ) -> Result<([f64; N], f64, [[f64; N]; 12]), StepperError> {
        let t = self.t;
        let y = &self.y;
        let mut yt = [0.0; N];

        for i in 0..N {
            yt[i] = y[i] + h * A21 * k1[i];
        }
        let k2 = sys.derivs(t + C2 * h, &yt);
        for i in 0..N {
            yt[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
        }
        let k3 = sys.derivs(t + C3 * h, &yt);
        for i in 0..N {
            yt[i] = y[i] + h * (A41 * k1[i] + A43 * k3[i]);
        }
        let k4 = sys.derivs(t + C4 * h, &yt);
        for i in 0..N {
            yt[i] = y[i] + h * (A51 * k1[i] + A53 * k3[i] + A54 * k4[i]);
        }
        let k5 = sys.derivs(t + C5 * h, &yt);
        for i in 0..N {
            yt[i] = y[i] + h * (A61 * k1[i] + A64 * k4[i] + A65 * k5[i]);
        }
        let k6 = sys.derivs(t + C6 * h, &yt);
        for i in 0..N {
            yt[i] = y[i] + h * (A71 * k1[i] + A74 * k4[i] + A75 * k5[i] + A76 * k6[i]);
        }
        let k7 = sys.derivs(t + C7 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A81 * k1[i] + A84 * k4[i] + A85 * k5[i] + A86 * k6[i] + A87 * k7[i]);
        }
        let k8 = sys.derivs(t + C8 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A91 * k1[i]
                    + A94 * k4[i]
                    + A95 * k5[i]
                    + A96 * k6[i]
                    + A97 * k7[i]
                    + A98 * k8[i]);
        }
        let k9 = sys.derivs(t + C9 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A101 * k1[i]
                    + A104 * k4[i]
                    + A105 * k5[i]
                    + A106 * k6[i]
                    + A107 * k7[i]
                    + A108 * k8[i]
                    + A109 * k9[i]);
        }
        let k10 = sys.derivs(t + C10 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A111 * k1[i]
                    + A114 * k4[i]
                    + A115 * k5[i]
                    + A116 * k6[i]
                    + A117 * k7[i]
                    + A118 * k8[i]
                    + A119 * k9[i]
                    + A1110 * k10[i]);
        }
        let k11 = sys.derivs(t + C11 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A121 * k1[i]
                    + A124 * k4[i]
                    + A125 * k5[i]
                    + A126 * k6[i]
                    + A127 * k7[i]
                    + A128 * k8[i]
                    + A129 * k9[i]
                    + A1210 * k10[i]
                    + A1211 * k11[i]);
        }
        let k12 = sys.derivs(t + h, &yt);

        let mut y_new = [0.0; N];
        let mut err5 = 0.0;
        let mut err3 = 0.0;
        for i in 0..N {
            let inc = B1 * k1[i]
                + B6 * k6[i]
                + B7 * k7[i]
                + B8 * k8[i]
                + B9 * k9[i]
                + B10 * k10[i]
                + B11 * k11[i]
                + B12 * k12[i];
            y_new[i] = self.y[i] + h * inc;

            let sk = STEP_ABS_TOL + STEP_REL_TOL * self.y[i].abs().max(y_new[i].abs());
            let e5 = (ER1 * k1[i]
                + ER6 * k6[i]
                + ER7 * k7[i]
                + ER8 * k8[i]
                + ER9 * k9[i]
                + ER10 * k10[i]
                + ER11 * k11[i]
                + ER12 * k12[i])
                / sk;
            let e3 = (inc - BHH1 * k1[i] - BHH2 * k9[i] - BHH3 * k12[i]) / sk;
            err5 += e5 * e5;
            err3 += e3 * e3;
        }
        let mut deno = err5 + 0.01 * err3;
        if deno <= 0.0 {
            deno = 1.0;
        }
        let err = h.abs() * err5 * (1.0 / (N as f64 * deno)).sqrt();
        if !err.is_finite() {
            return Err(StepperError::NonFinite { t });
        }

        let ks = [*k1, k2, k3, k4, k5, k6, k7, k8, k9, k10, k11, k12];
        Ok((y_new, err, ks))
    }

    /// Computes the three extra stages and the 8 coefficient vectors of the
    /// continuous extension of the step just accepted.
    #[allow(clippy::needless_range_loop)]
    fn prepare_dense(
        &mut self,
        h: f64,
        k1: &[f64; N],
        ks: &[[f64; N]; 12],
        y_new: &[f64; N],
        sys: &mut impl Derivatives<N>,
    ) {
        let t = self.t;
        let y = &self.y;
        let (k6, k7, k8, k9, k10, k11, k12) =
            (&ks[5], &ks[6], &ks[7], &ks[8], &ks[9], &ks[10], &ks[11]);
        let k13 = sys.derivs(t + h, y_new);

        let mut yt = [0.0; N];
        for i in 0..N {
            yt[i] = y[i]
                + h * (A141 * k1[i]
                    + A147 * k7[i]
                    + A148 * k8[i]
                    + A149 * k9[i]
                    + A1410 * k10[i]
                    + A1411 * k11[i]
                    + A1412 * k12[i]
                    + A1413 * k13[i]);
        }
        let k14 = sys.derivs(t + C14 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A151 * k1[i]
                    + A156 * k6[i]
                    + A157 * k7[i]
                    + A158 * k8[i]
                    + A1511 * k11[i]
                    + A1512 * k12[i]
                    + A1513 * k13[i]
                    + A1514 * k14[i]);
        }
        let k15 = sys.derivs(t + C15 * h, &yt);
        for i in 0..N {
            yt[i] = y[i]
                + h * (A161 * k1[i]
                    + A166 * k6[i]
                    + A167 * k7[i]
                    + A168 * k8[i]
                    + A169 * k9[i]
                    + A1613 * k13[i]
                    + A1614 * k14[i]
                    + A1615 * k15[i]);
        }
        let k16 = sys.derivs(t + C16 * h, &yt);

        for i in 0..N {
            let ydiff = y_new[i] - y[i];
            let bspl = h * k1[i] - ydiff;
            self.cont[0][i] = y[i];
            self.cont[1][i] = ydiff;
            self.cont[2][i] = bspl;
            self.cont[3][i] = ydiff - h * k13[i] - bspl;
            self.cont[4][i] = h
                * (D41 * k1[i]
                    + D46 * k6[i]
                    + D47 * k7[i]
                    + D48 * k8[i]
                    + D49 * k9[i]
                    + D410 * k10[i]
                    + D411 * k11[i]
                    + D412 * k12[i]
                    + D413 * k13[i]
                    + D414 * k14[i]
                    + D415 * k15[i]
                    + D416 * k16[i]);
            self.cont[5][i] = h
                * (D51 * k1[i]
                    + D56 * k6[i]
                    + D57 * k7[i]
                    + D58 * k8[i]
                    + D59 * k9[i]
                    + D510 * k10[i]
                    + D511 * k11[i]
                    + D512 * k12[i]
                    + D513 * k13[i]
                    + D514 * k14[i]
                    + D515 * k15[i]
                    + D516 * k16[i]);
            self.cont[6][i] = h
                * (D61 * k1[i]
                    + D66 * k6[i]
                    + D67 * k7[i]
                    + D68 * k8[i]
                    + D69 * k9[i]
                    + D610 * k10[i]
                    + D611 * k11[i]
                    + D612 * k12[i]
                    + D613 * k13[i]
                    + D614 * k14[i]
                    + D615 * k15[i]
                    + D616 * k16[i]);
            self.cont[7][i] = h
                * (D71 * k1[i]
                    + D76 * k6[i]
                    + D77 * k7[i]
                    + D78 * k8[i]
                    + D79 * k9[i]
                    + D710 * k10[i]
                    + D711 * k11[i]
                    + D712 * k12[i]
                    + D713 * k13[i]
                    + D714 * k14[i]
                    + D715 * k15[i]
                    + D716 * k16[i]);
        }
    }

    /// Component `i` of the solution at any `t` inside the last accepted
    /// step, from the continuous extension. The cost does not depend on the
    /// step size; the step endpoints are reproduced exactly.
    pub fn dense(&self, i: usize, t: f64) -> f64 {
        let s = (t - self.t_old) / self.h_did;
        let s1 = 1.0 - s;
        let c = &self.cont;
        c[0][i]
            + s * (c[1][i]
                + s1 * (c[2][i]
                    + s * (c[3][i]
                        + s1 * (c[4][i]
                            + s * (c[5][i] + s1 * (c[6][i] + s * c[7][i]))))))
    }

    /// The full state at `t` inside the last accepted step.
    pub fn dense_state(&self, t: f64) -> [f64; N] {
        std::array::from_fn(|i| self.dense(i, t))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exponential_decay() {
        let mut stepper = Dop853::new(0.0, [1.0]);
        let mut rhs = |_t: f64, y: &[f64; 1]| [-y[0]];
        let mut h: f64 = 1e-3;
        while stepper.t() < 5.0 {
            let outcome = stepper.step(h.min(5.0 - stepper.t()), &mut rhs).unwrap();
            assert!(outcome.h_did > 0.0);
            h = outcome.h_next;
        }
        assert!((stepper.y()[0] - (-stepper.t()).exp()).abs() < 1e-10);
    }

    #[test]
    fn test_harmonic_oscillator() {
        let mut stepper = Dop853::new(0.0, [1.0, 0.0]);
        let mut rhs = |_t: f64, y: &[f64; 2]| [y[1], -y[0]];
        let mut h: f64 = 1e-3;
        let t_end = 10.0 * std::f64::consts::TAU;
        while stepper.t() < t_end {
            h = stepper
                .step(h.min(t_end - stepper.t()), &mut rhs)
                .unwrap()
                .h_next;
        }
        assert!((stepper.y()[0] - stepper.t().cos()).abs() < 1e-8);
        assert!((stepper.y()[1] + stepper.t().sin()).abs() < 1e-8);
    }

    #[test]
    fn test_dense_output_reproduces_endpoints() {
        let mut stepper = Dop853::new(0.0, [1.0, -0.5]);
        let mut rhs = |t: f64, y: &[f64; 2]| [y[1], t - y[0]];
        let before = *stepper.y();
        let outcome = stepper.step(0.1, &mut rhs).unwrap();

        for i in 0..2 {
            assert!((stepper.dense(i, stepper.t_old()) - before[i]).abs() < 1e-12);
            let t_end = stepper.t_old() + outcome.h_did;
            assert!((stepper.dense(i, t_end) - stepper.y()[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dense_output_interior_accuracy() {
        // y' = y has the exact interior solution e^t.
        let mut stepper = Dop853::new(0.0, [1.0]);
        let mut rhs = |_t: f64, y: &[f64; 1]| [y[0]];
        stepper.step(0.5, &mut rhs).unwrap();
        let h = stepper.h_did();
        for frac in [0.1, 0.25, 0.5, 0.75, 0.9] {
            let t = stepper.t_old() + frac * h;
            assert!((stepper.dense(0, t) - t.exp()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nan_rhs_is_an_error() {
        let mut stepper = Dop853::new(0.0, [1.0]);
        let mut rhs = |_t: f64, _y: &[f64; 1]| [f64::NAN];
        assert!(stepper.step(0.1, &mut rhs).is_err());
    }

    quickcheck::quickcheck! {
        fn prop_dense_endpoints_for_any_step(h: f64) -> bool {
            let h = if h.is_finite() { h.abs() % 1.0 } else { 0.5 };
            let h = if h < 1e-6 { 0.5 } else { h };
            let mut stepper = Dop853::new(0.0, [1.0, 0.0]);
            let mut rhs = |_t: f64, y: &[f64; 2]| [y[1], -y[0]];
            let before = *stepper.y();
            let Ok(outcome) = stepper.step(h, &mut rhs) else {
                return false;
            };
            let t_end = stepper.t_old() + outcome.h_did;
            outcome.h_did > 0.0
                && (0..2).all(|i| {
                    (stepper.dense(i, stepper.t_old()) - before[i]).abs() < 1e-12
                        && (stepper.dense(i, t_end) - stepper.y()[i]).abs() < 1e-12
                })
        }
    }

    #[test]
    fn test_reset_discards_dense_state() {
        let mut stepper = Dop853::new(0.0, [1.0]);
        let mut rhs = |_t: f64, y: &[f64; 1]| [-y[0]];
        stepper.step(0.1, &mut rhs).unwrap();
        stepper.reset(2.0, [5.0]);
        assert_eq!(stepper.t(), 2.0);
        assert_eq!(stepper.y()[0], 5.0);
        assert_eq!(stepper.h_did(), 0.0);
    }
}
